//! Generation backend handlers.

use axum::Json;
use axum::extract::State;

use taleweaver_types::llm::BackendStatus;

use crate::http::error::AppError;
use crate::http::extractors::user::CurrentUser;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/generation/test - Probe the configured backend.
///
/// Always 200; reachability is reported in the body.
pub async fn test_backend(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<Json<ApiResponse<BackendStatus>>, AppError> {
    let timer = RequestTimer::start();
    let status = state.tale_service.check_backend().await;
    Ok(Json(timer.success(status)))
}
