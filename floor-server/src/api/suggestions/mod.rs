//! Suggestion API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/suggestions | POST | 为客人数排序候选桌台与拼桌 |
//! | /api/suggestions/accept | POST | 采纳建议 (重新校验后入座或预留) |

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/suggestions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::suggest))
        .route("/accept", post(handler::accept))
}
