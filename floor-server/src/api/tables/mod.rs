//! Dining Table API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::deactivate),
        )
        .route("/{id}/state", get(handler::get_state).post(handler::set_state))
        .route("/{id}/timer", get(crate::api::floor::timer))
        .route("/batch", post(handler::batch_upsert))
}
