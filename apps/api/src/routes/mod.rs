pub mod health;
pub mod roles;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::matching::handlers as matching;
use crate::pipeline::handlers as pipeline;
use crate::state::AppState;

// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/roles", get(roles::handle_list_roles))
        .route("/api/v1/match", post(matching::handle_match))
        .route("/api/v1/analyze", post(pipeline::handle_analyze))
        .route(
            "/api/v1/analyze/upload",
            post(pipeline::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}
