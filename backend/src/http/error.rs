//! HTTP error handling.
//!
//! Every failure renders as `{"failure": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::FailureResponse;
use crate::auth::AuthError;
use crate::db::repository::RepositoryError;

pub const USER_NOT_FOUND: &str = "user does not exist";
pub const BAD_PASSWORD: &str = "password does not match";
pub const USER_EXISTS: &str = "user already exists";

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or unverifiable credentials (400)
    BadRequest(String),
    /// Login refused (401)
    Unauthorized(String),
    /// Resource already exists (409)
    Conflict(String),
    /// Undecodable input or unexpected failure (500)
    Internal(String),
    /// Repository error (500, message passed through)
    Repository(RepositoryError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::Internal(msg) => f.write_str(msg),
            AppError::Repository(e) => write!(f, "{}", e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }

        let body = FailureResponse {
            failure: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) => AppError::Internal(err.to_string()),
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(RepositoryError::not_found("gone")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_auth_errors_map_to_bad_request() {
        let err = AppError::from(AuthError::BadHeader);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "bad authentication header format");

        let err = AppError::from(AuthError::EmptyUser);
        assert_eq!(err.to_string(), "invalid auth token");
    }

    #[test]
    fn test_repository_message_passes_through() {
        let err = AppError::from(RepositoryError::query("relation does not exist"));
        assert_eq!(err.to_string(), "Query error: relation does not exist");
    }
}
