//! Error taxonomy for the HRMS service and its HTTP rendering

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use common::error::{DatabaseError, is_unique_violation};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Message returned for every authentication failure, whichever check failed
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Could not validate credentials.";

/// Custom error type for the HRMS service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity absent
    #[error("{0}")]
    NotFound(String),

    /// Bad password, bad or expired token, or inactive subject
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Operation not permitted on the target record
    #[error("{0}")]
    InvalidOperation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Translate a driver error, turning integrity failures into `Conflict`
    pub fn from_sqlx(err: sqlx::Error, conflict_message: &str) -> Self {
        if is_unique_violation(&err) {
            ServiceError::Conflict(conflict_message.to_string())
        } else {
            ServiceError::Database(DatabaseError::Query(err))
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::from_sqlx(err, "Resource already exists.")
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ServiceError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServiceError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            ServiceError::InvalidOperation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServiceError::Database(e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServiceError::Internal(e) => {
                error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        if matches!(self, ServiceError::InvalidCredentials) {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response();
        }

        (status, body).into_response()
    }
}

/// Type alias for service results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ServiceError::InvalidOperation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_invalid_credentials_challenges_bearer() {
        let response = ServiceError::InvalidCredentials.into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_row_not_found_is_not_a_conflict() {
        let err = ServiceError::from_sqlx(sqlx::Error::RowNotFound, "taken");
        assert!(matches!(err, ServiceError::Database(_)));
    }
}
