//! Authentication and user administration routes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    AppState,
    error::{ServiceError, ServiceResult},
    extract::{JsonBody, PathParam},
    middleware::CurrentUser,
    models::{Identity, IdentityPatch, NewUser},
    validation,
};

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: Identity,
}

/// Request for token refresh
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Request for a password change
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Register a standard user
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewUser>,
) -> ServiceResult<impl IntoResponse> {
    info!("Registration request for user: {}", payload.username);
    validation::validate_new_user(&payload)?;

    let password_hash = state.auth.hash_password(&payload.password).await?;
    let identity = state.identities.register(&payload, &password_hash).await?;

    Ok((StatusCode::CREATED, Json(identity)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> ServiceResult<impl IntoResponse> {
    info!("Login attempt for user: {}", payload.username);

    let identity = state
        .auth
        .authenticate(&payload.username, &payload.password)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    let tokens = state.auth.issue_tokens(&identity)?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "bearer",
        expires_in: state.auth.access_token_expiry(),
        user: identity,
    }))
}

/// Refresh token endpoint
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshTokenRequest>,
) -> ServiceResult<impl IntoResponse> {
    info!("Token refresh request");

    let tokens = state.auth.refresh(&payload.refresh_token).await?;

    Ok(Json(TokenResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        token_type: "bearer",
        expires_in: state.auth.access_token_expiry(),
    }))
}

/// The authenticated caller
pub async fn me(CurrentUser(identity): CurrentUser) -> Json<Identity> {
    Json(identity)
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> ServiceResult<StatusCode> {
    info!("Password change for identity: {}", identity.id);
    validation::validate_password(&payload.new_password)?;

    state
        .auth
        .change_password(&identity, &payload.current_password, &payload.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// All non-employee identities
pub async fn list_users(State(state): State<AppState>) -> ServiceResult<Json<Vec<Identity>>> {
    Ok(Json(state.identities.list_users().await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<IdentityPatch>,
) -> ServiceResult<Json<Identity>> {
    if let Some(Some(username)) = &patch.username {
        validation::validate_username(username)?;
    }
    if let Some(email) = &patch.email {
        validation::validate_email(email)?;
    }

    Ok(Json(state.identities.update(id, &patch).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ServiceResult<Json<Identity>> {
    Ok(Json(state.identities.delete(id).await?))
}
