//! Axum route handlers for the per-session search flow.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::query::{SearchFilters, SortMode};
use crate::models::upload::UploadedFile;
use crate::search::{SearchMode, TextSearch};
use crate::session::SessionSnapshot;
use crate::state::AppState;
use crate::suggest::SuggestionOutcome;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: SearchMode,
}

#[derive(Debug, Deserialize)]
pub struct FiltersRequest {
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default)]
    pub sort: SortMode,
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct RecentSearches {
    pub recent: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreatedSession>) {
    let session = state.sessions.create();
    (
        StatusCode::CREATED,
        Json(CreatedSession {
            session_id: session.id(),
            created_at: session.created_at(),
        }),
    )
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/:id/view
pub async fn handle_get_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.get(id)?.snapshot()))
}

/// PUT /api/v1/sessions/:id/mode
pub async fn handle_switch_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.switch_mode(request.mode).await))
}

/// POST /api/v1/sessions/:id/search
///
/// Search failures come back as an `error` view, not an HTTP error.
pub async fn handle_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TextSearch>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.search_text(request).await?))
}

/// PUT /api/v1/sessions/:id/filters
pub async fn handle_apply_filters(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FiltersRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.apply_filters(request.filters, request.sort).await?))
}

/// GET /api/v1/sessions/:id/suggestions?query=
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<SuggestionOutcome>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.suggest(&params.query).await))
}

/// GET /api/v1/sessions/:id/recent
pub async fn handle_recent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecentSearches>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(RecentSearches {
        recent: session.recent_searches(),
    }))
}

/// POST /api/v1/sessions/:id/cv
///
/// Multipart field `file`. Non-PDFs are rejected before the session sees them.
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let payload = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        let file = UploadedFile::from_upload(name, content_type.as_deref(), payload)?;
        return Ok(Json(session.replace_file(Some(file)).await));
    }

    Err(AppError::Validation(
        "Missing multipart field 'file'".to_string(),
    ))
}

/// DELETE /api/v1/sessions/:id/cv
pub async fn handle_remove_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let session = state.sessions.get(id)?;
    Ok(Json(session.replace_file(None).await))
}
