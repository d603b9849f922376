use crate::domain::auth_guard::AuthGuard;
use crate::domain::auth_model::AccessTokenClaims;
use crate::providers::keys::JwksKeyStore;
use crate::providers::keys::KeyProvider;
use crate::providers::keys::StaticKeyStore;
use crate::providers::token::JwtTokenImpl;
use axum::routing::get;
use axum::Json;
use axum::Router;
use axum::Server;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jwt_simple::prelude::Claims;
use jwt_simple::prelude::Duration;
use jwt_simple::prelude::JWTClaims;
use jwt_simple::prelude::RS256KeyPair;
use jwt_simple::prelude::RSAKeyPairLike;
use serde_json::json;
use std::net::TcpListener;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration as StdDuration;

pub(crate) const ISSUER: &str = "https://drinks.test/";
pub(crate) const AUDIENCE: &str = "drinks";

pub(crate) fn key_pair() -> &'static RS256KeyPair {
    static KEY_PAIR: OnceLock<RS256KeyPair> = OnceLock::new();
    KEY_PAIR.get_or_init(|| RS256KeyPair::generate(2048).expect("key generation failed"))
}

pub(crate) fn claims(permissions: Option<&[&str]>) -> JWTClaims<AccessTokenClaims> {
    let custom = AccessTokenClaims {
        permissions: permissions.map(|p| p.iter().map(|s| s.to_string()).collect()),
    };

    Claims::with_custom_claims(custom, Duration::from_mins(5))
        .with_issuer(ISSUER)
        .with_audience(AUDIENCE)
        .with_subject("auth0|bartender")
}

pub(crate) fn sign(claims: JWTClaims<AccessTokenClaims>) -> String {
    key_pair().sign(claims).expect("signing failed")
}

pub(crate) fn bearer(permissions: &[&str]) -> String {
    format!("Bearer {}", sign(claims(Some(permissions))))
}

pub(crate) fn token_impl_with(keys: Arc<dyn KeyProvider>) -> JwtTokenImpl {
    JwtTokenImpl::new(
        keys,
        ISSUER.to_string(),
        AUDIENCE.to_string(),
        vec!["RS256".to_string()],
    )
}

pub(crate) fn token_impl() -> JwtTokenImpl {
    let pem = key_pair()
        .public_key()
        .to_pem()
        .expect("public key export failed");
    let keys = StaticKeyStore::from_pem(&[pem]).expect("public key import failed");

    token_impl_with(Arc::new(keys))
}

pub(crate) fn jwks_store(url: &str) -> JwksKeyStore {
    JwksKeyStore::new(
        url.to_string(),
        StdDuration::from_secs(600),
        vec!["RS256".to_string()],
    )
    .expect("could not build key set client")
}

// JWK for the shared test key pair
pub(crate) fn jwk(kid: &str) -> serde_json::Value {
    let components = key_pair().public_key().to_components();
    json!({
        "kty": "RSA",
        "use": "sig",
        "alg": "RS256",
        "kid": kid,
        "n": URL_SAFE_NO_PAD.encode(components.n),
        "e": URL_SAFE_NO_PAD.encode(components.e),
    })
}

pub(crate) fn guard() -> AuthGuard {
    AuthGuard::new(Arc::new(token_impl()))
}

// Serves `body` as a key set on a loopback port, counting fetches
pub(crate) async fn serve_jwks(body: serde_json::Value) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            let counter = counter.clone();
            let body = body.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(body)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").expect("could not bind loopback port");
    let addr = listener.local_addr().expect("no local address");
    let server = Server::from_tcp(listener)
        .expect("could not serve on loopback port")
        .serve(app.into_make_service());
    tokio::spawn(server);

    (format!("http://{}/.well-known/jwks.json", addr), hits)
}
