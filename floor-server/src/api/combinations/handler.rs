//! Combination API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Combination, CombinationChange, CombinationCreate, CombinationDissolve};

use crate::api::StateChangeRequest;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppResult, ok};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Defaults to true: dissolved combinations are history
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

/// GET /api/combinations?active_only=false
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Json<ApiResponse<Vec<Combination>>> {
    ok(state.engine.list_combinations(query.active_only))
}

/// GET /api/combinations/{id} - 包括已解散的
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Combination>>> {
    Ok(ok(state.engine.get_combination(id)?))
}

/// POST /api/combinations - 拼桌 (第一张为主桌)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CombinationCreate>,
) -> AppResult<Json<ApiResponse<CombinationChange>>> {
    Ok(ok(state.engine.create_combination(payload)?))
}

/// POST /api/combinations/{id}/state - 所有成员同步流转
pub async fn set_state(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StateChangeRequest>,
) -> AppResult<Json<ApiResponse<CombinationChange>>> {
    Ok(ok(state.engine.set_combination_state(id, req.status, req.change)?))
}

/// POST /api/combinations/{id}/dissolve - 解散拼桌
pub async fn dissolve(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<CombinationDissolve>,
) -> AppResult<Json<ApiResponse<CombinationChange>>> {
    Ok(ok(state.engine.dissolve_combination(id, req)?))
}
