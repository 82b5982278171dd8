//! Suggestion API Handlers

use axum::{Json, extract::State};
use shared::models::{Suggestion, SuggestionAccept, SuggestionQuery};

use crate::core::ServerState;
use crate::floor::AcceptedSuggestion;
use crate::utils::{ApiResponse, AppResult, ok};

/// POST /api/suggestions
pub async fn suggest(
    State(state): State<ServerState>,
    Json(query): Json<SuggestionQuery>,
) -> AppResult<Json<ApiResponse<Vec<Suggestion>>>> {
    Ok(ok(state.engine.suggest(&query)?))
}

/// POST /api/suggestions/accept
pub async fn accept(
    State(state): State<ServerState>,
    Json(payload): Json<SuggestionAccept>,
) -> AppResult<Json<ApiResponse<AcceptedSuggestion>>> {
    Ok(ok(state.engine.accept_suggestion(payload)?))
}
