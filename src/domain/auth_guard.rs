use crate::domain::auth_model::AccessTokenClaims;
use crate::domain::auth_model::AuthError;
use crate::domain::auth_model::AuthPayload;
use crate::domain::auth_model::Permission;
use crate::providers::token::JwtTokenImpl;
use crate::providers::token::TokenImplError;
use log::warn;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthGuard {
    token: Arc<JwtTokenImpl>,
}

impl AuthGuard {
    pub fn new(token: Arc<JwtTokenImpl>) -> Self {
        Self { token }
    }
}

impl AuthGuard {
    pub async fn authenticate(&self, raw_header: Option<&str>) -> Result<AuthPayload, AuthError> {
        let header = raw_header.ok_or_else(AuthError::missing_authorization)?;
        let raw_token = parse_bearer(header)?;

        let claims = self
            .token
            .validate_token::<AccessTokenClaims>(raw_token)
            .await
            .map_err(|err| {
                warn!("rejected bearer token: {}", err);
                match err {
                    TokenImplError::TokenExpired => AuthError::invalid_token("Token expired."),
                    _ => AuthError::invalid_token("Unable to verify authentication token."),
                }
            })?;

        let permissions = claims
            .custom
            .permissions
            .ok_or_else(AuthError::invalid_claims)?;

        Ok(AuthPayload {
            subject: claims.subject,
            issuer: claims.issuer,
            permissions: permissions.into_iter().collect(),
        })
    }

    pub fn authorize(payload: AuthPayload, required: &Permission) -> Result<AuthPayload, AuthError> {
        if payload.has(required) {
            Ok(payload)
        } else {
            Err(AuthError::unauthorized())
        }
    }
}

// Exactly two single-space separated parts, so doubled whitespace never parses
pub fn parse_bearer(header: &str) -> Result<&str, AuthError> {
    let parts: Vec<&str> = header.split(' ').collect();

    if !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(AuthError::invalid_header(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    match parts.as_slice() {
        [_] | [_, ""] => Err(AuthError::invalid_header("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
        )),
    }
}
