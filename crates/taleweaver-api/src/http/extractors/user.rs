//! Current-user extractors.
//!
//! Credentials are verified upstream; the gateway forwards the verified user
//! id in `X-User-Id`. These extractors only read that header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use taleweaver_types::tale::UserId;

use crate::http::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Required current user. Rejects with 401 when the header is missing.
pub struct CurrentUser(pub UserId);

/// Optional current user, for routes that anonymous callers may use.
pub struct MaybeUser(pub Option<UserId>);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)?.map(CurrentUser).ok_or_else(|| {
            AppError::Unauthorized(
                "Missing user identity. Provide it via the 'X-User-Id' header.".to_string(),
            )
        })
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_parts(parts)?))
    }
}

/// Blank headers count as absent; non-UTF-8 headers are rejected.
fn user_from_parts(parts: &Parts) -> Result<Option<UserId>, AppError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header encoding".to_string()))?
        .trim();
    Ok((!value.is_empty()).then(|| UserId::new(value)))
}
