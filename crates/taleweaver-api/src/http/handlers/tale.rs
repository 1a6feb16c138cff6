//! Tale handlers for the REST API.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Serialize;

use taleweaver_types::error::TaleError;
use taleweaver_types::tale::{
    CreateTaleRequest, GenerateTaleRequest, GeneratedTale, LikeStatus, TaleId, TaleView,
    UpdateTaleRequest, UserId,
};

use crate::http::error::AppError;
use crate::http::extractors::user::{CurrentUser, MaybeUser};
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// Generated draft plus the requesting user, who becomes the author if the
/// draft is later saved.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    #[serde(flatten)]
    pub tale: GeneratedTale,
    pub author: UserId,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

/// Malformed ids cannot name an existing tale.
fn parse_tale_id(raw: &str) -> Result<TaleId, AppError> {
    raw.parse().map_err(|_| AppError::Tale(TaleError::NotFound))
}

fn tale_link(id: &TaleId) -> String {
    format!("/api/v1/tales/{id}")
}

/// GET /api/v1/tales/public - Public tales, newest first.
pub async fn list_public(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> Result<Json<ApiResponse<Vec<TaleView>>>, AppError> {
    let timer = RequestTimer::start();
    let tales = state.tale_service.list_public_tales(viewer.as_ref()).await?;
    Ok(Json(timer.success(tales).with_link("self", "/api/v1/tales/public")))
}

/// GET /api/v1/tales/user - The caller's own tales, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<Vec<TaleView>>>, AppError> {
    let timer = RequestTimer::start();
    let tales = state.tale_service.list_my_tales(&user).await?;
    Ok(Json(timer.success(tales).with_link("self", "/api/v1/tales/user")))
}

/// POST /api/v1/tales/generate - Generate an unsaved draft.
pub async fn generate(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<GenerateTaleRequest>,
) -> Result<Json<ApiResponse<GenerateResponse>>, AppError> {
    let timer = RequestTimer::start();
    let tale = state.tale_service.generate(body).await?;
    let resp = timer
        .success(GenerateResponse { tale, author: user })
        .with_link("save", "/api/v1/tales");
    Ok(Json(resp))
}

/// POST /api/v1/tales - Save a tale.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(body): Json<CreateTaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TaleView>>), AppError> {
    let timer = RequestTimer::start();
    let tale = state.tale_service.create_tale(&user, body).await?;
    let link = tale_link(&tale.id);
    let resp = timer
        .success(TaleView::new(tale))
        .with_link("self", &link)
        .with_link("like", &format!("{link}/like"));
    Ok((StatusCode::CREATED, Json(resp)))
}

/// PATCH /api/v1/tales/{id} - Change visibility. Author only.
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaleRequest>,
) -> Result<Json<ApiResponse<TaleView>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tale_id(&id)?;
    let tale = state.tale_service.update_visibility(&id, &user, body).await?;
    Ok(Json(timer.success(TaleView::new(tale)).with_link("self", &tale_link(&id))))
}

/// DELETE /api/v1/tales/{id} - Delete permanently. Author only.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteResponse>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tale_id(&id)?;
    state.tale_service.delete_tale(&id, &user).await?;
    Ok(Json(timer.success(DeleteResponse {
        deleted: true,
        id: id.to_string(),
    })))
}

/// POST /api/v1/tales/{id}/like - Toggle the caller's like.
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LikeStatus>>, AppError> {
    let timer = RequestTimer::start();
    let id = parse_tale_id(&id)?;
    let status = state.tale_service.toggle_like(&id, &user).await?;
    Ok(Json(timer.success(status).with_link("tale", &tale_link(&id))))
}
