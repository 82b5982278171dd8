//! Floor snapshot and occupancy timers
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/floor | GET | 活动桌台、状态、拼桌、计时器 |
//! | /api/timers | GET | 所有运行中的计时器 |
//! | /api/timers/{table_id} | GET | 单桌计时器 |

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::models::{FloorSnapshot, OccupancyTimer};

use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/floor", get(snapshot))
        .route("/api/timers", get(timers))
        .route("/api/timers/{table_id}", get(timer))
}

pub async fn snapshot(State(state): State<ServerState>) -> Json<ApiResponse<FloorSnapshot>> {
    ok(state.engine.snapshot())
}

pub async fn timers(State(state): State<ServerState>) -> Json<ApiResponse<Vec<OccupancyTimer>>> {
    ok(state.engine.timers())
}

/// 404 for unknown tables; tables that are not `ocupada` have no timer
pub async fn timer(
    State(state): State<ServerState>,
    Path(table_id): Path<i64>,
) -> AppResult<Json<ApiResponse<OccupancyTimer>>> {
    state.engine.get_table(table_id)?;
    let timer = state.engine.timer(table_id).ok_or_else(|| {
        AppError::with_message(ErrorCode::NotFound, format!("Table {} has no running timer", table_id))
            .with_detail("table_id", table_id)
    })?;
    Ok(ok(timer))
}
