use axum::{
    extract::{Path, State},
    Json,
};

use crate::detail::DetailView;
use crate::state::AppState;

/// GET /api/v1/jobs/:id
///
/// Always 200: an unreachable job service yields a fallback record with a
/// `warning`.
pub async fn handle_job_detail(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<DetailView> {
    Json(state.details.load(&job_id).await)
}
