//! Table state store (桌台状态)
//!
//! Holds the live [`TableState`] of every table and computes the next state
//! for a requested transition. Nothing here commits; the engine persists the
//! planned record first and only then calls [`TableStateStore::insert`].

use std::collections::HashMap;

use shared::models::{StateChange, TableState, TableStatus};

use super::error::{FloorError, FloorResult};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

#[derive(Debug, Default)]
pub struct TableStateStore {
    states: HashMap<i64, TableState>,
}

impl TableStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, table_id: i64) -> Option<&TableState> {
        self.states.get(&table_id)
    }

    pub fn require(&self, table_id: i64) -> FloorResult<&TableState> {
        self.states
            .get(&table_id)
            .ok_or(FloorError::TableNotFound(table_id))
    }

    pub fn insert(&mut self, state: TableState) {
        self.states.insert(state.table_id, state);
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableState> {
        self.states.values()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Plan a single-table transition
///
/// Rejects combined tables, stale `expected_version` and edges outside the
/// transition graph. Entering a rest status clears reservation, party size
/// and estimated release.
pub fn plan_transition(
    current: &TableState,
    target: TableStatus,
    change: &StateChange,
    now: i64,
) -> FloorResult<TableState> {
    if let Some(combination_id) = current.combination_id {
        return Err(FloorError::CombinationConflict {
            table_id: current.table_id,
            combination_id,
        });
    }
    check_version("table_state", current.table_id, current.version, change.expected_version)?;
    if !current.status.can_transition_to(target) {
        return Err(FloorError::InvalidTransition {
            entity: "table",
            id: current.table_id,
            from: current.status,
            to: target,
        });
    }
    validate_change(change)?;

    let mut next = current.clone();
    apply_status(&mut next, target, change, now);
    Ok(next)
}

/// Compare an optimistic-concurrency token against the stored version
pub fn check_version(
    entity: &'static str,
    id: i64,
    actual: u64,
    expected: Option<u64>,
) -> FloorResult<()> {
    match expected {
        Some(expected) if expected != actual => Err(FloorError::ConcurrentModification {
            entity,
            id,
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

pub fn validate_change(change: &StateChange) -> FloorResult<()> {
    if change.party_size == Some(0) {
        return Err(FloorError::Validation(
            "party_size must be greater than 0".to_string(),
        ));
    }
    validate_optional_text(&change.note, "note", MAX_NOTE_LEN).map_err(FloorError::Validation)
}

/// Write `target` and the change fields into `state`, bumping its version
///
/// Shared by single-table transitions and combination member updates.
pub fn apply_status(state: &mut TableState, target: TableStatus, change: &StateChange, now: i64) {
    if target.is_rest_status() {
        state.reservation_id = None;
        state.party_size = None;
        state.estimated_release = None;
        state.note = change.note.clone();
    } else {
        // reservada -> ocupada keeps the booking it was held for
        state.reservation_id = change
            .reservation_id
            .clone()
            .or_else(|| state.reservation_id.take());
        state.party_size = change.party_size.or(state.party_size);
        state.estimated_release = change.estimated_release.or(state.estimated_release);
        if change.note.is_some() {
            state.note = change.note.clone();
        }
    }

    if target == TableStatus::Occupied {
        if state.status != TableStatus::Occupied {
            state.occupied_at = Some(now);
        }
    } else {
        state.occupied_at = None;
    }

    state.status = target;
    state.updated_at = now;
    state.updated_by = change.actor.clone();
    state.version += 1;
}
