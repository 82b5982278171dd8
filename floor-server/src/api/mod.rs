//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`floor`] - 楼面快照与计时器
//! - [`tables`] - 桌台管理与状态
//! - [`combinations`] - 拼桌
//! - [`suggestions`] - 分配建议
//! - [`feed`] - 远端变更入口

pub mod combinations;
pub mod feed;
pub mod floor;
pub mod health;
pub mod suggestions;
pub mod tables;

use axum::Router;
use http::{HeaderName, HeaderValue};
use serde::Deserialize;
use shared::models::{StateChange, TableStatus};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{ApiResponse, AppResult, ok};

/// Body of `POST .../state`: target status plus the change fields
#[derive(Debug, Clone, Deserialize)]
pub struct StateChangeRequest {
    pub status: TableStatus,
    #[serde(flatten)]
    pub change: StateChange,
}

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(floor::router())
        .merge(tables::router())
        .merge(combinations::router())
        .merge(suggestions::router())
        .merge(feed::router())
}

/// Build a fully configured application with all middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - screens run on other origins
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .with_state(state)
}
