//! Change feed API
//!
//! Peer nodes and the reservation system push [`FeedEvent`]s here. Each event
//! goes through [`crate::floor::ChangeFeedAdapter`]; the response says whether
//! it was applied, already seen, stale or our own echo.

use axum::{Json, Router, extract::State, routing::post};
use shared::message::FeedEvent;

use crate::core::ServerState;
use crate::floor::FeedOutcome;
use crate::utils::{ApiResponse, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/feed", post(apply))
        .route("/api/feed/batch", post(apply_batch))
}

/// POST /api/feed
pub async fn apply(
    State(state): State<ServerState>,
    Json(event): Json<FeedEvent>,
) -> AppResult<Json<ApiResponse<FeedOutcome>>> {
    Ok(ok(state.feed.apply(&event)?))
}

/// POST /api/feed/batch - 按顺序应用，遇到第一个错误即停止
pub async fn apply_batch(
    State(state): State<ServerState>,
    Json(events): Json<Vec<FeedEvent>>,
) -> AppResult<Json<ApiResponse<Vec<FeedOutcome>>>> {
    let mut outcomes = Vec::with_capacity(events.len());
    for event in &events {
        outcomes.push(state.feed.apply(event)?);
    }
    Ok(ok(outcomes))
}
