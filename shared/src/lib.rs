//! Shared types for the floor service
//!
//! Models, error codes, response structures and message types used by the
//! floor server and by the screens that render the floor plan.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, EventType, FeedEntity, FeedEvent};
