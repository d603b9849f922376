use crate::http::into_responses::ApiError;
use axum::async_trait;
use axum::body::HttpBody;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Path;
use axum::http::request::Parts;
use axum::http::Request;
use axum::BoxError;
use axum::Json;
use serde::de::DeserializeOwned;

pub(super) struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S, B> FromRequest<S, B> for JsonBody<T>
where
    T: DeserializeOwned,
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rej| {
                log::debug!("rejected request body: {}", rej.body_text());
                ApiError::BadRequest
            })?;

        Ok(JsonBody(value))
    }
}

// Non-integer ids cannot name a drink, so they are not found
pub(super) struct DrinkId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for DrinkId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw_id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        raw_id
            .parse::<i64>()
            .map(DrinkId)
            .map_err(|_| ApiError::NotFound)
    }
}
