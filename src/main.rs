mod config;
mod domain;
mod http;
mod providers;
#[cfg(test)]
mod test_support;

use crate::config::Config;
use crate::domain::auth_guard::AuthGuard;
use crate::domain::drink_store::DrinkStore;
use crate::http::drinks_route;
use crate::http::AppContext;
use crate::providers::keys::JwksKeyStore;
use crate::providers::keys::KeyProvider;
use crate::providers::keys::StaticKeyStore;
use crate::providers::state::SqliteStateImpl;
use crate::providers::token::JwtTokenImpl;
use axum::Server;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    pretty_env_logger::init_timed();

    let config = Config::from_env().expect("could not read configuration");

    let state_impl = Arc::new(
        SqliteStateImpl::new(&config.database_url)
            .await
            .expect("could not connect to database"),
    );

    if config.reset_database {
        log::warn!("dropping and recreating the drinks table");
        state_impl
            .drop_and_create_all()
            .await
            .expect("could not reset database");
    } else {
        state_impl
            .ensure_schema()
            .await
            .expect("could not create database schema");
    }

    let key_provider: Arc<dyn KeyProvider> = match &config.public_keys_pem {
        Some(public_keys_pem) => Arc::new(
            StaticKeyStore::from_pem(public_keys_pem).expect("could not import pem keys"),
        ),
        None => Arc::new(
            JwksKeyStore::new(
                config.jwks_url.clone(),
                config.jwks_cache,
                config.algorithms.clone(),
            )
            .expect("could not build key set client"),
        ),
    };

    let token_impl = Arc::new(JwtTokenImpl::new(
        key_provider,
        config.issuer.clone(),
        config.audience.clone(),
        config.algorithms.clone(),
    ));

    let ctx = AppContext::new(
        AuthGuard::new(token_impl.clone()),
        DrinkStore::new(state_impl.clone()),
    );

    let app = drinks_route(ctx);

    log::info!("listening on {}", config.listen_addr);

    Server::bind(&config.listen_addr)
        .serve(app.into_make_service())
        .await
        .expect("server error");
}
