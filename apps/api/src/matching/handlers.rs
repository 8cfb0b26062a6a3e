use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::MatchOutcome;
use crate::pipeline::handlers::validate_top_k;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub resume_text: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// POST /api/v1/match
pub async fn handle_match(
    State(state): State<AppState>,
    Json(req): Json<MatchRequest>,
) -> Result<Json<MatchOutcome>, AppError> {
    validate_top_k(req.top_k)?;
    let outcome = state
        .pipeline
        .match_only(&req.resume_text, req.top_k)
        .await?;
    Ok(Json(outcome))
}
