use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

fn upstream_mode(offline: bool) -> &'static str {
    if offline {
        "offline"
    } else {
        "remote"
    }
}

/// GET /health
/// Returns service version, which upstreams are live, and the session count.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "seekcareer-gateway",
        "job_service": upstream_mode(state.config.job_service_offline()),
        "cv_service": upstream_mode(state.config.cv_service_offline()),
        "sessions": state.sessions.count(),
        "details_loading": state.details.is_loading(),
    }))
}
