//! Unified error handling for the API.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthServiceError;

/// Application-level error type for API handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Request body failed validation; field name -> messages.
    #[error("Validation failed")]
    Validation(BTreeMap<String, Vec<String>>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation error for a single field.
    pub fn field(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_owned(), vec![message.to_owned()]);
        Self::Validation(errors)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("resource not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::field("non_field_errors", &msg),
            other => Self::Database(other),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(e: AuthServiceError) -> Self {
        match e {
            AuthServiceError::Validation(errors) => Self::Validation(errors),
            AuthServiceError::InvalidCredentials => {
                Self::field("non_field_errors", "Unable to log in with provided credentials.")
            }
            AuthServiceError::Repository(repo) => Self::from(repo),
            AuthServiceError::Hash(msg) => Self::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Validation errors keep their per-field shape; everything else is
        // a {"detail": ...} body. Internal details never reach the client.
        let body = match &self {
            Self::Validation(errors) => json!(errors),
            Self::Database(_) | Self::Internal(_) => json!({"detail": "Internal server error"}),
            other => json!({"detail": other.to_string()}),
        };

        (status, Json(body)).into_response()
    }
}

/// Convenience alias for handler return types.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("offer 42".to_string());
        assert_eq!(err.to_string(), "Not found: offer 42");

        let err = AppError::Forbidden("not your offer".to_string());
        assert_eq!(err.to_string(), "Forbidden: not your offer");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            let response = err.into_response();
            response.status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::field("title", "required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_not_found_maps_to_404() {
        let err = AppError::from(RepositoryError::NotFound);
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_repository_conflict_maps_to_validation() {
        let err = AppError::from(RepositoryError::Conflict("duplicate".to_string()));
        let AppError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors["non_field_errors"], vec!["duplicate".to_string()]);
    }
}
