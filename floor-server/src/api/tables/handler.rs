//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{DiningTable, DiningTableUpsert, TableFilter, TableState};

use crate::api::StateChangeRequest;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// GET /api/tables - 按条件列出桌台 (zone, is_active, combinable, min_capacity)
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<TableFilter>,
) -> Json<ApiResponse<Vec<DiningTable>>> {
    ok(state.engine.list_tables(&filter))
}

/// GET /api/tables/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    Ok(ok(state.engine.get_table(id)?))
}

/// POST /api/tables - 创建桌台 (payload 带 id 时更新)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableUpsert>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    Ok(ok(state.engine.upsert_table(payload)?))
}

/// PUT /api/tables/{id}
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<DiningTableUpsert>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    if payload.id.is_some_and(|body_id| body_id != id) {
        return Err(AppError::validation(format!(
            "body id does not match path id {}",
            id
        )));
    }
    payload.id = Some(id);
    Ok(ok(state.engine.upsert_table(payload)?))
}

/// POST /api/tables/batch - 逐个保存，遇到第一个错误即停止
pub async fn batch_upsert(
    State(state): State<ServerState>,
    Json(payload): Json<Vec<DiningTableUpsert>>,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let mut saved = Vec::with_capacity(payload.len());
    for req in payload {
        saved.push(state.engine.upsert_table(req)?);
    }
    Ok(ok(saved))
}

/// DELETE /api/tables/{id} - 停用桌台 (软删除)
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    Ok(ok(state.engine.deactivate_table(id)?))
}

/// GET /api/tables/{id}/state
pub async fn get_state(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<TableState>>> {
    Ok(ok(state.engine.get_state(id)?))
}

/// POST /api/tables/{id}/state - 状态流转
pub async fn set_state(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StateChangeRequest>,
) -> AppResult<Json<ApiResponse<TableState>>> {
    Ok(ok(state.engine.set_state(id, req.status, req.change)?))
}
