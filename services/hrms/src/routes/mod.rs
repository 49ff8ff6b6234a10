//! HTTP routes for the HRMS service

pub mod attendance;
pub mod auth;
pub mod departments;
pub mod employees;

use axum::{
    Json, Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{AppState, middleware::auth_middleware};

/// Create the router for the HRMS service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/users", get(auth::list_users))
        .route(
            "/auth/users/:id",
            put(auth::update_user).delete(auth::delete_user),
        )
        .route(
            "/departments",
            get(departments::list).post(departments::create),
        )
        .route(
            "/departments/:id",
            put(departments::update).delete(departments::delete),
        )
        .route("/employees", get(employees::list).post(employees::create))
        .route("/employees/:id", delete(employees::delete))
        .route("/attendance", post(attendance::mark))
        .route("/attendance/:employee_id", get(attendance::list))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn root() -> impl IntoResponse {
    Json(json!({ "message": "HRMS Lite Backend Running" }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or_else(|e| {
            error!("Health check failed: {}", e);
            false
        });

    Json(json!({
        "status": "ok",
        "service": "hrms",
        "database": database,
    }))
}
