//! Request extractors that reject with the service's JSON error body
//!
//! The stock `Json` and `Path` extractors answer malformed input with a
//! plain-text response. These wrappers turn every such rejection into a
//! `ServiceError::Validation`, so clients always see `{"error": ...}`.

use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ServiceError;

/// JSON request body
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("Rejected request body: {}", rejection.body_text());
                ServiceError::Validation(rejection.body_text())
            })?;

        Ok(JsonBody(value))
    }
}

/// Typed path parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!("Rejected path parameters: {}", rejection.body_text());
                ServiceError::Validation(rejection.body_text())
            })?;

        Ok(PathParam(value))
    }
}
