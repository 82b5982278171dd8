//! Occupancy Timer Model

use serde::{Deserialize, Serialize};

/// Urgency tier derived from elapsed vs. expected occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Under 70% of the expected duration
    Green,
    /// 70% to 100%
    Amber,
    /// Past the estimated release
    Red,
}

impl Urgency {
    /// Classify elapsed against expected duration.
    ///
    /// Integer arithmetic keeps the 70% boundary exact.
    pub fn classify(elapsed_secs: u64, expected_secs: u64) -> Self {
        if (elapsed_secs as u128) * 10 < (expected_secs as u128) * 7 {
            Urgency::Green
        } else if elapsed_secs <= expected_secs {
            Urgency::Amber
        } else {
            Urgency::Red
        }
    }
}

/// Per-table occupancy timer (derived, never persisted)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyTimer {
    pub table_id: i64,
    /// Unix millis
    pub occupied_at: i64,
    pub expected_secs: u64,
    pub is_active: bool,
    pub elapsed_secs: u64,
    pub urgency: Urgency,
}
