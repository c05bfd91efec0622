//! Application error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use passage_core::auth::AuthError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Upstream provider error: {0}")]
    BadGateway(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::BadGateway(m) => (StatusCode::BAD_GATEWAY, "bad_gateway", m.as_str()),
            AppError::Internal(m) => {
                error!(error = %m, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidInput(msg) => AppError::Validation(msg),
            AuthError::NotFound(msg) => AppError::NotFound(msg),
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::InvalidRefreshToken => {
                AppError::Unauthorized("Invalid refresh token".into())
            }
            AuthError::Expired => AppError::Unauthorized("Token expired".into()),
            AuthError::EmailNotVerified => AppError::Forbidden("Email not verified".into()),
            AuthError::ExchangeFailed(msg) | AuthError::ProfileFetchFailed(msg) => {
                AppError::BadGateway(msg)
            }
            AuthError::Db(e) => AppError::Internal(e.to_string()),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AuthError) -> StatusCode {
        AppError::from(e).into_response().status()
    }

    #[test]
    fn auth_errors_map_to_statuses() {
        assert_eq!(status_of(AuthError::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AuthError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AuthError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::InvalidRefreshToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::Expired), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AuthError::EmailNotVerified), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AuthError::ExchangeFailed("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_of(AuthError::ProfileFetchFailed("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AuthError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn refresh_and_access_failures_stay_distinguishable() {
        let a = AppError::from(AuthError::InvalidToken).to_string();
        let b = AppError::from(AuthError::InvalidRefreshToken).to_string();
        let c = AppError::from(AuthError::Expired).to_string();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
