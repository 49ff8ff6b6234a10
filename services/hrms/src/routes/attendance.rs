//! Attendance routes

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::{
    AppState,
    error::ServiceResult,
    extract::{JsonBody, PathParam},
    models::{Attendance, NewAttendance},
    validation,
};

pub async fn mark(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewAttendance>,
) -> ServiceResult<impl IntoResponse> {
    let status = validation::parse_attendance_status(&payload.status)?;

    let attendance = state
        .attendance
        .mark(payload.employee_id, payload.date, status)
        .await?;

    Ok((StatusCode::CREATED, Json(attendance)))
}

/// Attendance history for one identity; unknown ids yield an empty list
pub async fn list(
    State(state): State<AppState>,
    PathParam(employee_id): PathParam<i64>,
) -> ServiceResult<Json<Vec<Attendance>>> {
    Ok(Json(state.attendance.list_for_employee(employee_id).await?))
}
