use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;
use crate::wizard::capabilities::CapabilityError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Username already exists! Choose a different one.")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Validation(String),

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("{0}")]
    Capability(String),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Password hashing failed")]
    PasswordHash,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            // Only `users` carries a unique key.
            StoreError::Duplicate { .. } => AppError::UsernameTaken,
            StoreError::Unavailable(msg) => AppError::PersistenceUnavailable(msg),
            StoreError::Malformed(e) => AppError::Internal(e.into()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::UsernameTaken => AppError::UsernameTaken,
            AuthError::InvalidCredentials => AppError::InvalidCredentials,
            AuthError::MissingField(field) => {
                AppError::Validation(format!("Please enter a {field}."))
            }
            AuthError::PasswordHash => AppError::PasswordHash,
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<CapabilityError> for AppError {
    fn from(e: CapabilityError) -> Self {
        AppError::Capability(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::UsernameTaken => (StatusCode::CONFLICT, "USERNAME_TAKEN", self.to_string()),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::PersistenceUnavailable(msg) => {
                tracing::error!("Persistence error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PERSISTENCE_UNAVAILABLE",
                    "The database is unavailable, please try again".to_string(),
                )
            }
            AppError::Capability(msg) => {
                tracing::error!("Capability error: {msg}");
                (StatusCode::BAD_GATEWAY, "CAPABILITY_ERROR", msg.clone())
            }
            AppError::Session(e) => {
                tracing::error!("Session error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::PasswordHash => {
                tracing::error!("Password hashing failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::UsernameTaken, StatusCode::CONFLICT),
            (AppError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AppError::validation("nope"), StatusCode::BAD_REQUEST),
            (
                AppError::PersistenceUnavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AppError::Capability("x".to_string()), StatusCode::BAD_GATEWAY),
            (AppError::PasswordHash, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_duplicate_key_maps_to_username_taken() {
        let err: AppError = StoreError::Duplicate {
            collection: crate::store::Collection::Users,
            key: "username",
        }
        .into();
        assert!(matches!(err, AppError::UsernameTaken));
    }

    #[test]
    fn test_unavailable_store_maps_to_persistence_unavailable() {
        let err: AppError = StoreError::Unavailable("connection reset".to_string()).into();
        assert!(matches!(err, AppError::PersistenceUnavailable(msg) if msg == "connection reset"));
    }
}
