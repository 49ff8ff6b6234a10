//! Middleware for bearer token validation and authentication

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{debug, info};

use crate::{
    AppState,
    error::ServiceError,
    jwt::TokenType,
    models::Identity,
};

/// The authenticated caller, placed in request extensions by `auth_middleware`
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

/// Resolve the bearer access token to an active identity
///
/// A missing or malformed header, a refresh token, or a token whose subject
/// is gone or inactive all produce the same 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServiceError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        debug!("Rejected {}: no bearer token", req.uri().path());
        return Err(ServiceError::InvalidCredentials);
    };

    let (_, identity) = state
        .auth
        .validate_token(bearer.token(), TokenType::Access)
        .await?;

    info!("Authenticated identity {} for {}", identity.id, req.uri().path());
    req.extensions_mut().insert(CurrentUser(identity));

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(ServiceError::InvalidCredentials)
    }
}
