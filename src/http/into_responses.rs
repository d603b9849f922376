use crate::domain::auth_model::AuthError;
use crate::domain::drink_model::DeleteDrinkOutput;
use crate::domain::drink_model::DrinksOutput;
use crate::domain::drink_store::DrinkStoreError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

const BAD_REQUEST: &str = "Bad request";
const NOT_FOUND: &str = "Resource not found";
const METHOD_NOT_ALLOWED: &str = "Method not allowed";
const UNPROCESSABLE: &str = "unprocessable";
const INTERNAL_SERVER_ERROR: &str = "Internal server error, please try again later";

// Failures raised by routing and extraction, before any handler runs
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,
    #[error("resource not found")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal server error")]
    Internal,
}

fn error_envelope(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "error": status.as_u16(),
        "message": message,
    }));

    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest => (StatusCode::BAD_REQUEST, BAD_REQUEST),
            ApiError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR),
        };

        error_envelope(status, message)
    }
}

impl IntoResponse for DrinkStoreError {
    fn into_response(self) -> Response {
        match self {
            DrinkStoreError::NotFound => error_envelope(StatusCode::NOT_FOUND, NOT_FOUND),
            DrinkStoreError::Invalid(message) => error_envelope(StatusCode::BAD_REQUEST, message),
            DrinkStoreError::MalformedRecipe(_) | DrinkStoreError::Unprocessable(_) => {
                error_envelope(StatusCode::UNPROCESSABLE_ENTITY, UNPROCESSABLE)
            }
            DrinkStoreError::StateImplError(_) | DrinkStoreError::CorruptRecipe { .. } => {
                error_envelope(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        error_envelope(status, &self.description)
    }
}

impl<T: Serialize> IntoResponse for DrinksOutput<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(json!(self))).into_response()
    }
}

impl IntoResponse for DeleteDrinkOutput {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(json!(self))).into_response()
    }
}
