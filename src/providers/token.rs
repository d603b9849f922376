use crate::providers::keys::KeyProvider;
use crate::providers::keys::KeySetError;
use jwt_simple::prelude::JWTClaims;
use jwt_simple::prelude::RSAPublicKeyLike;
use jwt_simple::prelude::Token;
use jwt_simple::prelude::VerificationOptions;
use jwt_simple::JWTError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Clone)]
pub struct JwtTokenImpl {
    keys: Arc<dyn KeyProvider>,
    issuer: String,
    audience: String,
    algorithms: Vec<String>,
}

#[derive(Debug, Error)]
pub enum TokenImplError {
    #[error(transparent)]
    JwtImplError(#[from] jwt_simple::Error),
    #[error(transparent)]
    KeySetError(#[from] KeySetError),
    #[error("algorithm {0} is not allowed")]
    UnsupportedAlgorithm(String),
    #[error("token expired")]
    TokenExpired,
}

impl JwtTokenImpl {
    pub fn new(
        keys: Arc<dyn KeyProvider>,
        issuer: String,
        audience: String,
        algorithms: Vec<String>,
    ) -> Self {
        Self {
            keys,
            issuer,
            audience,
            algorithms,
        }
    }
}

impl JwtTokenImpl {
    pub async fn validate_token<T: Serialize + DeserializeOwned>(
        &self,
        raw_token: &str,
    ) -> Result<JWTClaims<T>, TokenImplError> {
        let metadata = Token::decode_metadata(raw_token)?;

        if !self
            .algorithms
            .iter()
            .any(|alg| alg.as_str() == metadata.algorithm())
        {
            return Err(TokenImplError::UnsupportedAlgorithm(
                metadata.algorithm().to_string(),
            ));
        }

        let keys = self.keys.keys_for(metadata.key_id()).await?;

        let mut last_error = None;
        for key in keys.iter() {
            match key.verify_token::<T>(raw_token, Some(self.verification_options())) {
                Ok(claims) => return Ok(claims),
                Err(err) => last_error = Some(err),
            }
        }

        let err =
            last_error.unwrap_or_else(|| jwt_simple::Error::new(JWTError::InvalidSignature));

        match err.downcast_ref::<JWTError>() {
            Some(JWTError::TokenHasExpired) => Err(TokenImplError::TokenExpired),
            _ => Err(TokenImplError::JwtImplError(err)),
        }
    }

    fn verification_options(&self) -> VerificationOptions {
        VerificationOptions {
            allowed_issuers: Some(HashSet::from([self.issuer.clone()])),
            allowed_audiences: Some(HashSet::from([self.audience.clone()])),
            time_tolerance: None,
            ..VerificationOptions::default()
        }
    }
}
