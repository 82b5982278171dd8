//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /health | GET | 简单健康检查 |
//! | /health/detailed | GET | 引擎与存储计数 |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;
use crate::floor::engine::FloorStats;
use crate::storage::StorageStats;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    node_id: String,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    node_id: String,
    uptime_seconds: u64,
    floor: FloorStats,
    storage: CheckResult<StorageStats>,
    /// Live subscribers of the message bus
    subscribers: usize,
    /// Remote entities tracked by the feed adapter
    feed_tracked: usize,
}

#[derive(Serialize)]
pub struct CheckResult<T> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

pub async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.config.node_id.clone(),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let storage = match state.engine.storage().get_stats() {
        Ok(stats) => CheckResult {
            status: "ok",
            data: Some(stats),
            message: None,
        },
        Err(e) => CheckResult {
            status: "error",
            data: None,
            message: Some(format!("Storage error: {}", e)),
        },
    };

    Json(DetailedHealthResponse {
        status: if storage.status == "ok" { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.config.node_id.clone(),
        uptime_seconds: state.uptime_secs(),
        floor: state.engine.stats(),
        storage,
        subscribers: state.message_bus.subscriber_count(),
        feed_tracked: state.feed.tracked(),
    })
}
