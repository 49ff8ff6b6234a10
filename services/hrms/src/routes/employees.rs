//! Employee routes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use crate::{
    AppState,
    error::ServiceResult,
    extract::{JsonBody, PathParam},
    models::{Identity, NewEmployee},
    validation,
};

/// Create an employee whose login is their email address
pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewEmployee>,
) -> ServiceResult<impl IntoResponse> {
    info!("Creating employee: {}", payload.employee_id);
    validation::validate_new_employee(&payload)?;

    let password_hash = state.auth.hash_password(&payload.password).await?;
    let employee = state
        .identities
        .create_employee(&payload, &password_hash)
        .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<Vec<Identity>>> {
    Ok(Json(state.identities.list_employees().await?))
}

pub async fn delete(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ServiceResult<Json<Identity>> {
    Ok(Json(state.identities.delete_employee(id).await?))
}
