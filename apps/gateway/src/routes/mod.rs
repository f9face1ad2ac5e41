pub mod health;
pub mod jobs;
pub mod sessions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

/// Largest CV accepted by the upload route.
const MAX_CV_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route("/api/v1/sessions/:id", delete(sessions::handle_close_session))
        .route("/api/v1/sessions/:id/view", get(sessions::handle_get_view))
        .route("/api/v1/sessions/:id/mode", put(sessions::handle_switch_mode))
        .route("/api/v1/sessions/:id/search", post(sessions::handle_search))
        .route(
            "/api/v1/sessions/:id/filters",
            put(sessions::handle_apply_filters),
        )
        .route(
            "/api/v1/sessions/:id/suggestions",
            get(sessions::handle_suggestions),
        )
        .route("/api/v1/sessions/:id/recent", get(sessions::handle_recent))
        .route(
            "/api/v1/sessions/:id/cv",
            post(sessions::handle_upload_cv)
                .delete(sessions::handle_remove_cv)
                .layer(DefaultBodyLimit::max(MAX_CV_BYTES)),
        )
        .route("/api/v1/jobs/:id", get(jobs::handle_job_detail))
        .with_state(state)
}
