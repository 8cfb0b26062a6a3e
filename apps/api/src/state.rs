use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::AnalysisPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the role corpus, vector index and embedder; read-only after startup.
    pub pipeline: Arc<AnalysisPipeline>,
}
