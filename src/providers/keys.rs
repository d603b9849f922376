use axum::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jwt_simple::prelude::RS256PublicKey;
use log::debug;
use log::error;
use log::warn;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error(transparent)]
    FetchError(#[from] reqwest::Error),
    #[error("key set endpoint returned {0}")]
    BadStatus(u16),
    #[error("invalid public key: {0}")]
    InvalidKey(jwt_simple::Error),
    #[error("key id {0} not found in key set")]
    UnknownKeyId(String),
    #[error("key set holds no usable signing keys")]
    Empty,
}

#[async_trait]
pub trait KeyProvider: Send + Sync {
    // every known key when the token names no key id
    async fn keys_for(&self, key_id: Option<&str>) -> Result<Vec<RS256PublicKey>, KeySetError>;
}

// Fixed keys from configuration
pub struct StaticKeyStore {
    public_keys: Vec<RS256PublicKey>,
}

impl StaticKeyStore {
    pub fn from_pem(public_keys_pem: &[String]) -> Result<Self, KeySetError> {
        let public_keys = public_keys_pem
            .iter()
            .map(|pem| RS256PublicKey::from_pem(pem))
            .collect::<Result<Vec<_>, _>>()
            .map_err(KeySetError::InvalidKey)?;

        if public_keys.is_empty() {
            return Err(KeySetError::Empty);
        }

        Ok(Self { public_keys })
    }
}

#[async_trait]
impl KeyProvider for StaticKeyStore {
    async fn keys_for(&self, _key_id: Option<&str>) -> Result<Vec<RS256PublicKey>, KeySetError> {
        Ok(self.public_keys.clone())
    }
}

// JWKS document (RFC 7517)
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<JwkKey>,
}

#[derive(Debug, Deserialize)]
struct JwkKey {
    kid: Option<String>,
    kty: String,
    #[serde(rename = "use")]
    key_use: Option<String>,
    alg: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

struct JwksCacheEntry {
    keys: HashMap<String, RS256PublicKey>,
    fetched_at: Instant,
}

// Refreshed when stale or when a token names an unknown key id
pub struct JwksKeyStore {
    url: String,
    refresh_interval: Duration,
    algorithms: Vec<String>,
    client: reqwest::Client,
    cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl JwksKeyStore {
    pub fn new(
        url: String,
        refresh_interval: Duration,
        algorithms: Vec<String>,
    ) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            url,
            refresh_interval,
            algorithms,
            client,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }
}

impl JwksKeyStore {
    // None means the cache cannot answer and a refresh is due
    async fn cached(
        &self,
        key_id: Option<&str>,
    ) -> Option<Result<Vec<RS256PublicKey>, KeySetError>> {
        let cache = self.cache.read().await;
        let entry = cache.as_ref()?;

        if entry.fetched_at.elapsed() >= self.refresh_interval {
            return None;
        }

        match key_id {
            Some(kid) => entry.keys.get(kid).map(|key| Ok(vec![key.clone()])),
            None if entry.keys.is_empty() => Some(Err(KeySetError::Empty)),
            None => Some(Ok(entry.keys.values().cloned().collect())),
        }
    }

    async fn refresh_keys(&self) -> Result<(), KeySetError> {
        debug!("fetching signing keys from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|err| {
            error!("could not fetch signing keys from {}: {}", self.url, err);
            err
        })?;

        if !response.status().is_success() {
            error!("{} answered {}", self.url, response.status());
            return Err(KeySetError::BadStatus(response.status().as_u16()));
        }

        let jwks = response.json::<JwksResponse>().await?;

        let keys: HashMap<String, RS256PublicKey> = jwks
            .keys
            .iter()
            .filter_map(|jwk| match decode_jwk(jwk, &self.algorithms) {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping key {:?}: {}", jwk.kid, err);
                    None
                }
            })
            .collect();

        debug!("loaded {} signing keys", keys.len());

        *self.cache.write().await = Some(JwksCacheEntry {
            keys,
            fetched_at: Instant::now(),
        });

        Ok(())
    }
}

#[async_trait]
impl KeyProvider for JwksKeyStore {
    async fn keys_for(&self, key_id: Option<&str>) -> Result<Vec<RS256PublicKey>, KeySetError> {
        if let Some(keys) = self.cached(key_id).await {
            return keys;
        }

        let _guard = self.refresh_lock.lock().await;

        // another request may have refreshed while we waited
        if let Some(keys) = self.cached(key_id).await {
            return keys;
        }

        self.refresh_keys().await?;

        match self.cached(key_id).await {
            Some(keys) => keys,
            None => match key_id {
                Some(kid) => Err(KeySetError::UnknownKeyId(kid.to_string())),
                None => Err(KeySetError::Empty),
            },
        }
    }
}

// Only RSA signing keys with a key id and an allowed algorithm are usable
fn decode_jwk(
    jwk: &JwkKey,
    algorithms: &[String],
) -> Result<Option<(String, RS256PublicKey)>, KeySetError> {
    if jwk.kty != "RSA" {
        return Ok(None);
    }
    if matches!(jwk.key_use.as_deref(), Some(key_use) if key_use != "sig") {
        return Ok(None);
    }
    if matches!(&jwk.alg, Some(alg) if !algorithms.contains(alg)) {
        return Ok(None);
    }

    let (Some(kid), Some(n), Some(e)) = (&jwk.kid, &jwk.n, &jwk.e) else {
        return Ok(None);
    };

    let n = URL_SAFE_NO_PAD
        .decode(n)
        .map_err(|err| KeySetError::InvalidKey(jwt_simple::Error::new(err)))?;
    let e = URL_SAFE_NO_PAD
        .decode(e)
        .map_err(|err| KeySetError::InvalidKey(jwt_simple::Error::new(err)))?;

    let key = RS256PublicKey::from_components(&n, &e)
        .map_err(KeySetError::InvalidKey)?
        .with_key_id(kid);

    Ok(Some((kid.clone(), key)))
}
