//! Department routes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    AppState,
    error::ServiceResult,
    extract::{JsonBody, PathParam},
    models::{Department, NewDepartment, UpdateDepartment},
    validation,
};

pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<Vec<Department>>> {
    Ok(Json(state.departments.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewDepartment>,
) -> ServiceResult<impl IntoResponse> {
    validation::validate_department_name(&payload.name)?;

    let department = state.departments.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn update(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<UpdateDepartment>,
) -> ServiceResult<Json<Department>> {
    if let Some(name) = &patch.name {
        validation::validate_department_name(name)?;
    }

    Ok(Json(state.departments.update(id, &patch).await?))
}

/// Delete a department; identities naming it are left as they are
pub async fn delete(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> ServiceResult<Json<Department>> {
    Ok(Json(state.departments.delete(id).await?))
}
