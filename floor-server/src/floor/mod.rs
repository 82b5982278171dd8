//! Floor engine (桌台占用与拼桌)
//!
//! # Structure
//!
//! ```text
//! floor/
//! ├── engine.rs       # FloorEngine: locking, persistence, events
//! ├── registry.rs     # physical tables
//! ├── state_store.rs  # per-table state machine
//! ├── timer.rs        # occupancy timers
//! ├── combination.rs  # merge / state / dissolve planning
//! ├── suggest.rs      # assignment scoring
//! ├── feed.rs         # inbound change feed
//! └── error.rs
//! ```
//!
//! Planning functions are pure over [`FloorState`]; only [`FloorEngine`]
//! takes the lock, writes redb and swaps memory.

pub mod combination;
pub mod engine;
pub mod error;
pub mod feed;
pub mod registry;
pub mod state_store;
pub mod suggest;
pub mod timer;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use shared::models::{Combination, TableState};

pub use engine::{AcceptedSuggestion, FloorChange, FloorEngine};
pub use error::{FloorError, FloorResult};
pub use feed::{ChangeFeedAdapter, FeedOutcome};
pub use registry::TableRegistry;
pub use state_store::TableStateStore;
pub use suggest::SuggestConfig;
pub use timer::{OccupancyTimers, UrgencyChange};

/// Engine tunables
#[derive(Debug, Clone)]
pub struct FloorConfig {
    /// Expected occupancy when a seating carries no estimated release
    pub default_occupancy_secs: u64,
    pub suggest: SuggestConfig,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            default_occupancy_secs: 7200,
            suggest: SuggestConfig::default(),
        }
    }
}

/// Everything the engine guards with its lock
#[derive(Debug, Default)]
pub struct FloorState {
    pub registry: TableRegistry,
    pub states: TableStateStore,
    pub combinations: HashMap<i64, Combination>,
    pub timers: OccupancyTimers,
}

impl FloorState {
    /// Active combination a table belongs to, if any
    pub fn combination_of(&self, table_id: i64) -> Option<&Combination> {
        self.states
            .get(table_id)
            .and_then(|s| s.combination_id)
            .and_then(|id| self.combinations.get(&id))
            .filter(|c| c.is_active)
    }

    pub fn active_combination(&self, id: i64) -> FloorResult<&Combination> {
        self.combinations
            .get(&id)
            .filter(|c| c.is_active)
            .ok_or(FloorError::CombinationNotFound(id))
    }

    /// State of an active table
    pub fn active_state(&self, table_id: i64) -> FloorResult<&TableState> {
        match self.registry.get(table_id) {
            Some(table) if table.is_active => self.states.require(table_id),
            _ => Err(FloorError::TableNotFound(table_id)),
        }
    }
}
