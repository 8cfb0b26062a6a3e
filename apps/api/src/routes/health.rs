use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and how many roles are indexed.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let index = state.pipeline.context().index();
    let status = if index.is_ready() { "ok" } else { "starting" };
    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "service": "rolefit",
        "roles_indexed": index.len()
    }))
}
