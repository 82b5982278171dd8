//! Data models
//!
//! Shared between the floor server and its clients (via API and change feed).
//! All IDs are `i64` snowflakes, all timestamps Unix millis.

pub mod combination;
pub mod dining_table;
pub mod suggestion;
pub mod table_state;
pub mod timer;
pub mod zone;

// Re-exports
pub use combination::*;
pub use dining_table::*;
pub use suggestion::*;
pub use table_state::*;
pub use timer::*;
pub use zone::*;

use serde::{Deserialize, Serialize};

/// Full floor snapshot for rendering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloorSnapshot {
    pub tables: Vec<DiningTable>,
    pub states: Vec<TableState>,
    pub combinations: Vec<Combination>,
    pub timers: Vec<OccupancyTimer>,
    pub taken_at: i64,
}
