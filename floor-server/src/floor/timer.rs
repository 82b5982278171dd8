//! Occupancy timers
//!
//! One running timer per `ocupada` table. Timers are derived data: they are
//! rebuilt from `TableState::occupied_at` at startup and follow every state
//! change through [`OccupancyTimers::sync`].

use std::collections::HashMap;

use shared::models::{OccupancyTimer, TableState, TableStatus, Urgency};
use shared::util::elapsed_secs;

/// Urgency tier crossed during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrgencyChange {
    pub table_id: i64,
    pub from: Urgency,
    pub to: Urgency,
    pub elapsed_secs: u64,
    pub expected_secs: u64,
}

#[derive(Debug, Default)]
pub struct OccupancyTimers {
    timers: HashMap<i64, OccupancyTimer>,
}

/// Expected service length for an occupied table
///
/// Uses the estimated release when it lies after `occupied_at`, else the default.
pub fn expected_secs_for(state: &TableState, default_secs: u64) -> u64 {
    match (state.occupied_at, state.estimated_release) {
        (Some(start), Some(release)) if release > start => elapsed_secs(start, release),
        _ => default_secs,
    }
}

impl OccupancyTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, table_id: i64, occupied_at: i64, expected_secs: u64, now: i64) {
        let elapsed = elapsed_secs(occupied_at, now);
        self.timers.insert(
            table_id,
            OccupancyTimer {
                table_id,
                occupied_at,
                expected_secs,
                is_active: true,
                elapsed_secs: elapsed,
                urgency: Urgency::classify(elapsed, expected_secs),
            },
        );
    }

    pub fn stop(&mut self, table_id: i64) -> Option<OccupancyTimer> {
        self.timers.remove(&table_id).map(|mut timer| {
            timer.is_active = false;
            timer
        })
    }

    /// Start, restart or stop the timer so it matches `state`
    pub fn sync(&mut self, state: &TableState, default_secs: u64, now: i64) {
        match (state.status, state.occupied_at) {
            (TableStatus::Occupied, Some(occupied_at)) => {
                let expected = expected_secs_for(state, default_secs);
                let unchanged = self.timers.get(&state.table_id).is_some_and(|t| {
                    t.occupied_at == occupied_at && t.expected_secs == expected
                });
                if !unchanged {
                    self.start(state.table_id, occupied_at, expected, now);
                }
            }
            _ => {
                self.stop(state.table_id);
            }
        }
    }

    /// Recompute elapsed time and urgency for every running timer
    ///
    /// Returns the timers whose tier changed, so callers can alert on red.
    pub fn tick(&mut self, now: i64) -> Vec<UrgencyChange> {
        let mut changes = Vec::new();
        for timer in self.timers.values_mut() {
            let elapsed = elapsed_secs(timer.occupied_at, now);
            let urgency = Urgency::classify(elapsed, timer.expected_secs);
            if urgency != timer.urgency {
                changes.push(UrgencyChange {
                    table_id: timer.table_id,
                    from: timer.urgency,
                    to: urgency,
                    elapsed_secs: elapsed,
                    expected_secs: timer.expected_secs,
                });
            }
            timer.elapsed_secs = elapsed;
            timer.urgency = urgency;
        }
        changes.sort_by_key(|c| c.table_id);
        changes
    }

    pub fn get(&self, table_id: i64) -> Option<&OccupancyTimer> {
        self.timers.get(&table_id)
    }

    pub fn list(&self) -> Vec<OccupancyTimer> {
        let mut timers: Vec<OccupancyTimer> = self.timers.values().cloned().collect();
        timers.sort_by_key(|t| t.table_id);
        timers
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
