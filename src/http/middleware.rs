use crate::domain::auth_guard::AuthGuard;
use crate::domain::auth_model::AuthError;
use crate::domain::auth_model::Permission;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

#[derive(Clone)]
pub(super) struct RequiredPermission {
    guard: Arc<AuthGuard>,
    permission: Permission,
}

impl RequiredPermission {
    pub(super) fn new(guard: &Arc<AuthGuard>, permission: Permission) -> Self {
        Self {
            guard: guard.clone(),
            permission,
        }
    }
}

// Runs before the handler; the payload is handed on as an extension
pub(super) async fn require_permission<B>(
    State(required): State<RequiredPermission>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AuthError> {
    let raw_header = match request.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| {
                    AuthError::invalid_header("Authorization header must be bearer token.")
                })?
                .to_string(),
        ),
    };

    let payload = required.guard.authenticate(raw_header.as_deref()).await?;
    let payload = AuthGuard::authorize(payload, &required.permission)?;

    log::debug!(
        "{} granted to {}",
        required.permission,
        payload.subject.as_deref().unwrap_or("anonymous")
    );

    request.extensions_mut().insert(payload);

    Ok(next.run(request).await)
}
