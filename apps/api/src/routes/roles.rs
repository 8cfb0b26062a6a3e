use axum::{extract::State, Json};
use serde::Serialize;

use crate::corpus::RoleSummary;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RoleListResponse {
    pub roles: Vec<RoleSummary>,
    pub total: usize,
}

/// GET /api/v1/roles
pub async fn handle_list_roles(State(state): State<AppState>) -> Json<RoleListResponse> {
    let roles = state.pipeline.context().corpus().summaries();
    Json(RoleListResponse {
        total: roles.len(),
        roles,
    })
}
