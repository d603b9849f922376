use serde::Deserialize;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

// Pure types for domain use
#[derive(Clone, Debug, PartialEq)]
pub struct AuthPayload {
    pub subject: Option<String>,
    pub issuer: Option<String>,
    pub permissions: BTreeSet<String>,
}

impl AuthPayload {
    pub fn has(&self, permission: &Permission) -> bool {
        self.permissions.contains(permission.as_str())
    }
}

// Custom claims carried next to the registered ones
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AccessTokenClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub const GET_DRINKS_DETAIL: Permission = Permission(Cow::Borrowed("get:drinks-detail"));
    pub const POST_DRINKS: Permission = Permission(Cow::Borrowed("post:drinks"));
    pub const PATCH_DRINKS: Permission = Permission(Cow::Borrowed("patch:drinks"));
    pub const DELETE_DRINKS: Permission = Permission(Cow::Borrowed("delete:drinks"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthErrorKind {
    MissingAuthorization,
    InvalidHeader,
    InvalidToken,
    InvalidClaims,
    Unauthorized,
}

impl AuthErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthErrorKind::InvalidClaims => 400,
            AuthErrorKind::Unauthorized => 403,
            _ => 401,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthErrorKind::MissingAuthorization => "missing_authorization",
            AuthErrorKind::InvalidHeader => "invalid_header",
            AuthErrorKind::InvalidToken => "invalid_token",
            AuthErrorKind::InvalidClaims => "invalid_claims",
            AuthErrorKind::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("{kind}: {description}")]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub description: String,
}

impl AuthError {
    pub fn new(kind: AuthErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn missing_authorization() -> Self {
        Self::new(
            AuthErrorKind::MissingAuthorization,
            "Authorization header is expected.",
        )
    }

    pub fn invalid_header(description: &str) -> Self {
        Self::new(AuthErrorKind::InvalidHeader, description)
    }

    pub fn invalid_token(description: &str) -> Self {
        Self::new(AuthErrorKind::InvalidToken, description)
    }

    pub fn invalid_claims() -> Self {
        Self::new(
            AuthErrorKind::InvalidClaims,
            "Permissions not included in JWT.",
        )
    }

    pub fn unauthorized() -> Self {
        Self::new(AuthErrorKind::Unauthorized, "Permission not found.")
    }
}
