//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use taleweaver_types::error::TaleError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Tale(TaleError),
    /// No (or an unusable) current-user identity.
    Unauthorized(String),
}

impl From<TaleError> for AppError {
    fn from(e: TaleError) -> Self {
        AppError::Tale(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Tale(TaleError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Tale(TaleError::NotFound) => {
                (StatusCode::NOT_FOUND, "TALE_NOT_FOUND", "Tale not found".to_string())
            }
            AppError::Tale(TaleError::Forbidden) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Not authorized to modify this tale".to_string(),
            ),
            AppError::Tale(TaleError::Generation(msg)) => {
                (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", msg.clone())
            }
            AppError::Tale(e @ TaleError::GenerationUnavailable) => {
                (StatusCode::SERVICE_UNAVAILABLE, "GENERATION_UNAVAILABLE", e.to_string())
            }
            AppError::Tale(e @ TaleError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", e.to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(%status, code, %message, "request failed");
        }
        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: AppError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(TaleError::Validation("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(TaleError::NotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(TaleError::Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(TaleError::Generation("empty".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(TaleError::GenerationUnavailable.into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(TaleError::Storage("disk".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Unauthorized("who?".into())),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::from(TaleError::NotFound).parts().1, "TALE_NOT_FOUND");
        assert_eq!(AppError::from(TaleError::Forbidden).parts().1, "FORBIDDEN");
    }
}
