//! FloorEngine - 桌台引擎
//!
//! Owns the floor state behind one `parking_lot::RwLock`. Every mutation:
//!
//! 1. takes the write lock,
//! 2. plans the new records (pure, see `state_store` / `combination`),
//! 3. commits them in one redb transaction,
//! 4. swaps them into memory and re-syncs timers,
//! 5. releases the lock and broadcasts a [`FloorChange`] per record.
//!
//! A failed plan or commit returns before step 4, so memory never diverges
//! from storage and multi-table operations are all-or-nothing.

use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::message::{FeedEntity, FeedEvent};
use shared::models::{
    Combination, CombinationChange, CombinationCreate, CombinationDissolve, DiningTable,
    DiningTableUpsert, FloorSnapshot, OccupancyTimer, StateChange, Suggestion, SuggestionAccept,
    SuggestionKind, SuggestionQuery, TableFilter, TableState, TableStatus,
};
use shared::util::now_millis;
use tokio::sync::broadcast;

use super::combination::{plan_create, plan_dissolve, plan_state};
use super::error::{FloorError, FloorResult};
use super::state_store::plan_transition;
use super::suggest::{eligible_tables, suggest};
use super::timer::UrgencyChange;
use super::{FloorConfig, FloorState};
use crate::storage::{FloorStorage, FloorWrite};

/// Change broadcast capacity
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One committed record, ready for the bus
#[derive(Debug, Clone)]
pub struct FloorChange {
    /// "created", "updated", "deactivated", "dissolved", "synced"
    pub action: &'static str,
    pub event: FeedEvent,
}

/// Result of accepting a suggestion
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AcceptedSuggestion {
    Table { state: TableState },
    Combination(CombinationChange),
}

/// Counters for health output
#[derive(Debug, Clone, Serialize)]
pub struct FloorStats {
    pub tables: usize,
    pub active_tables: usize,
    pub occupied: usize,
    pub active_combinations: usize,
    pub timers: usize,
}

pub struct FloorEngine {
    floor: RwLock<FloorState>,
    storage: FloorStorage,
    config: FloorConfig,
    /// Stamped as `origin` on every outgoing feed event
    node_id: String,
    event_tx: broadcast::Sender<FloorChange>,
}

impl std::fmt::Debug for FloorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FloorEngine")
            .field("storage", &"<FloorStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("node_id", &self.node_id)
            .finish()
    }
}

impl FloorEngine {
    /// Build the engine from whatever `storage` holds
    ///
    /// Tables without a state get a fresh `libre` one, and timers are rebuilt
    /// from `occupied_at` of every `ocupada` table.
    pub fn open(
        storage: FloorStorage,
        config: FloorConfig,
        node_id: impl Into<String>,
    ) -> FloorResult<Self> {
        let stored = storage.load()?;
        let now = now_millis();
        let mut floor = FloorState::default();

        for table in stored.tables {
            floor.registry.insert(table);
        }
        for state in stored.states {
            if floor.registry.get(state.table_id).is_some() {
                floor.states.insert(state);
            } else {
                tracing::warn!(table_id = state.table_id, "Dropping state of unknown table");
            }
        }
        for combination in stored.combinations {
            floor.combinations.insert(combination.id, combination);
        }

        let mut repaired = FloorWrite::default();
        for table in floor.registry.iter() {
            if floor.states.get(table.id).is_none() {
                repaired.states.push(TableState::new(table.id, now));
            }
        }
        if !repaired.is_empty() {
            tracing::warn!(count = repaired.states.len(), "Creating missing table states");
            storage.commit(&repaired)?;
            for state in repaired.states {
                floor.states.insert(state);
            }
        }

        for state in floor.states.iter() {
            floor
                .timers
                .sync(state, config.default_occupancy_secs, now);
        }

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let node_id = node_id.into();
        tracing::info!(
            node_id = %node_id,
            tables = floor.registry.len(),
            combinations = floor.combinations.values().filter(|c| c.is_active).count(),
            timers = floor.timers.len(),
            "Floor engine loaded"
        );

        Ok(Self {
            floor: RwLock::new(floor),
            storage,
            config,
            node_id,
            event_tx,
        })
    }

    /// Engine over an in-memory database
    pub fn in_memory(config: FloorConfig, node_id: impl Into<String>) -> FloorResult<Self> {
        Self::open(FloorStorage::open_in_memory()?, config, node_id)
    }

    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    pub fn storage(&self) -> &FloorStorage {
        &self.storage
    }

    /// Subscribe to committed changes
    pub fn subscribe(&self) -> broadcast::Receiver<FloorChange> {
        self.event_tx.subscribe()
    }

    // ========== Reads ==========

    pub fn list_tables(&self, filter: &TableFilter) -> Vec<DiningTable> {
        self.floor.read().registry.list(filter)
    }

    pub fn get_table(&self, id: i64) -> FloorResult<DiningTable> {
        self.floor.read().registry.require(id).cloned()
    }

    pub fn get_state(&self, table_id: i64) -> FloorResult<TableState> {
        self.floor.read().states.require(table_id).cloned()
    }

    pub fn list_combinations(&self, active_only: bool) -> Vec<Combination> {
        let floor = self.floor.read();
        let mut combinations: Vec<Combination> = floor
            .combinations
            .values()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        combinations.sort_by_key(|c| (c.created_at, c.id));
        combinations
    }

    /// Active or dissolved
    pub fn get_combination(&self, id: i64) -> FloorResult<Combination> {
        self.floor
            .read()
            .combinations
            .get(&id)
            .cloned()
            .ok_or(FloorError::CombinationNotFound(id))
    }

    pub fn timers(&self) -> Vec<OccupancyTimer> {
        self.floor.read().timers.list()
    }

    pub fn timer(&self, table_id: i64) -> Option<OccupancyTimer> {
        self.floor.read().timers.get(table_id).cloned()
    }

    /// Active tables with their states, active combinations and timers
    pub fn snapshot(&self) -> FloorSnapshot {
        let floor = self.floor.read();
        let tables = floor.registry.list(&TableFilter {
            is_active: Some(true),
            ..Default::default()
        });
        let states = tables
            .iter()
            .filter_map(|t| floor.states.get(t.id).cloned())
            .collect();
        let mut combinations: Vec<Combination> = floor
            .combinations
            .values()
            .filter(|c| c.is_active)
            .cloned()
            .collect();
        combinations.sort_by_key(|c| (c.created_at, c.id));
        // A deactivated table may still hold a timer from its last seating
        let timers = floor
            .timers
            .list()
            .into_iter()
            .filter(|t| tables.iter().any(|table| table.id == t.table_id))
            .collect();

        FloorSnapshot {
            tables,
            states,
            combinations,
            timers,
            taken_at: now_millis(),
        }
    }

    pub fn stats(&self) -> FloorStats {
        let floor = self.floor.read();
        FloorStats {
            tables: floor.registry.len(),
            active_tables: floor.registry.iter().filter(|t| t.is_active).count(),
            occupied: floor
                .states
                .iter()
                .filter(|s| s.status == TableStatus::Occupied)
                .count(),
            active_combinations: floor.combinations.values().filter(|c| c.is_active).count(),
            timers: floor.timers.len(),
        }
    }

    /// Ranked suggestions against the current floor
    pub fn suggest(&self, query: &SuggestionQuery) -> FloorResult<Vec<Suggestion>> {
        let floor = self.floor.read();
        let tables = eligible_tables(&floor);
        suggest(&tables, query, &self.config.suggest)
    }

    // ========== Registry ==========

    pub fn upsert_table(&self, req: DiningTableUpsert) -> FloorResult<DiningTable> {
        let now = now_millis();
        let (table, changes) = {
            let mut floor = self.floor.write();
            let table = floor.registry.prepare_upsert(&req, now)?;

            let existing = req.id.and_then(|id| floor.registry.get(id));
            if let Some(existing) = existing
                && let Some(combination) = floor.combination_of(existing.id)
                && (table.capacity != existing.capacity || !table.combinable || !table.is_active)
            {
                return Err(FloorError::CombinationConflict {
                    table_id: existing.id,
                    combination_id: combination.id,
                });
            }

            let created = existing.is_none();
            let mut write = FloorWrite {
                tables: vec![table.clone()],
                ..Default::default()
            };
            if floor.states.get(table.id).is_none() {
                write.states.push(TableState::new(table.id, now));
            }
            self.persist_and_apply(&mut floor, &write, now)?;
            let action = if created { "created" } else { "updated" };
            (table, self.changes(&write, action))
        };

        tracing::info!(table_id = table.id, number = table.number, "Table saved");
        self.publish(changes);
        Ok(table)
    }

    /// Soft delete: the table and its state are kept, `is_active` goes false
    pub fn deactivate_table(&self, id: i64) -> FloorResult<DiningTable> {
        let now = now_millis();
        let (table, changes) = {
            let mut floor = self.floor.write();
            let current = floor.registry.require(id)?;
            if !current.is_active {
                return Ok(current.clone());
            }
            if let Some(combination) = floor.combination_of(id) {
                return Err(FloorError::CombinationConflict {
                    table_id: id,
                    combination_id: combination.id,
                });
            }

            let mut table = current.clone();
            table.is_active = false;
            table.version += 1;
            table.updated_at = now;

            let write = FloorWrite {
                tables: vec![table.clone()],
                ..Default::default()
            };
            self.persist_and_apply(&mut floor, &write, now)?;
            (table, self.changes(&write, "deactivated"))
        };

        tracing::info!(table_id = id, "Table deactivated");
        self.publish(changes);
        Ok(table)
    }

    // ========== Table state ==========

    pub fn set_state(
        &self,
        table_id: i64,
        target: TableStatus,
        change: StateChange,
    ) -> FloorResult<TableState> {
        let now = now_millis();
        let (state, changes) = {
            let mut floor = self.floor.write();
            self.transition_locked(&mut floor, table_id, target, &change, now)?
        };
        self.publish(changes);
        Ok(state)
    }

    fn transition_locked(
        &self,
        floor: &mut FloorState,
        table_id: i64,
        target: TableStatus,
        change: &StateChange,
        now: i64,
    ) -> FloorResult<(TableState, Vec<FloorChange>)> {
        let current = floor.active_state(table_id)?;
        let from = current.status;
        let next = plan_transition(current, target, change, now)?;

        let write = FloorWrite {
            states: vec![next.clone()],
            ..Default::default()
        };
        self.persist_and_apply(floor, &write, now)?;

        tracing::info!(
            table_id,
            from = %from,
            to = %target,
            version = next.version,
            actor = change.actor.as_deref().unwrap_or("-"),
            "Table state changed"
        );
        Ok((next, self.changes(&write, "updated")))
    }

    // ========== Combinations ==========

    pub fn create_combination(&self, req: CombinationCreate) -> FloorResult<CombinationChange> {
        let now = now_millis();
        let (result, changes) = {
            let mut floor = self.floor.write();
            self.create_combination_locked(&mut floor, &req, now)?
        };
        self.publish(changes);
        Ok(result)
    }

    fn create_combination_locked(
        &self,
        floor: &mut FloorState,
        req: &CombinationCreate,
        now: i64,
    ) -> FloorResult<(CombinationChange, Vec<FloorChange>)> {
        let planned = plan_create(floor, req, self.config.suggest.max_distance, now)?;
        let write = combination_write(&planned);
        self.persist_and_apply(floor, &write, now)?;

        let combination = &planned.combination;
        if combination.is_optimal {
            tracing::info!(
                combination_id = combination.id,
                tables = ?combination.member_ids(),
                capacity = combination.capacity,
                status = %combination.status,
                "Combination created"
            );
        } else {
            tracing::warn!(
                combination_id = combination.id,
                tables = ?combination.member_ids(),
                "Combination created with non-adjacent or distant tables"
            );
        }
        Ok((planned.clone(), self.combination_changes(&planned, "created")))
    }

    pub fn set_combination_state(
        &self,
        id: i64,
        target: TableStatus,
        change: StateChange,
    ) -> FloorResult<CombinationChange> {
        let now = now_millis();
        let (planned, changes) = {
            let mut floor = self.floor.write();
            let from = floor.active_combination(id)?.status;
            let planned = plan_state(&floor, id, target, &change, now)?;
            let write = combination_write(&planned);
            self.persist_and_apply(&mut floor, &write, now)?;
            tracing::info!(combination_id = id, from = %from, to = %target, "Combination state changed");
            let changes = self.combination_changes(&planned, "updated");
            (planned, changes)
        };
        self.publish(changes);
        Ok(planned)
    }

    pub fn dissolve_combination(
        &self,
        id: i64,
        req: CombinationDissolve,
    ) -> FloorResult<CombinationChange> {
        let now = now_millis();
        let (planned, changes) = {
            let mut floor = self.floor.write();
            let planned = plan_dissolve(&floor, id, &req, now)?;
            let write = combination_write(&planned);
            self.persist_and_apply(&mut floor, &write, now)?;
            tracing::info!(
                combination_id = id,
                resulting = %planned.combination.status,
                "Combination dissolved"
            );
            let changes = self.combination_changes(&planned, "dissolved");
            (planned, changes)
        };
        self.publish(changes);
        Ok(planned)
    }

    /// Act on a suggestion after re-checking it against the live floor
    pub fn accept_suggestion(&self, accept: SuggestionAccept) -> FloorResult<AcceptedSuggestion> {
        let suggestion = &accept.suggestion;
        let now = now_millis();
        let target = if accept.seat_now {
            TableStatus::Occupied
        } else {
            TableStatus::Reserved
        };

        let (accepted, changes) = {
            let mut floor = self.floor.write();
            match suggestion.kind {
                SuggestionKind::Table => {
                    let table_id = match suggestion.table_ids.as_slice() {
                        [id] => *id,
                        _ => {
                            return Err(FloorError::Validation(
                                "a table suggestion names exactly one table".to_string(),
                            ));
                        }
                    };
                    let state = floor.active_state(table_id)?;
                    if let Some(combination_id) = state.combination_id {
                        return Err(FloorError::AlreadyCombined {
                            table_id,
                            combination_id,
                        });
                    }
                    if state.status != TableStatus::Free {
                        return Err(FloorError::TableNotFree {
                            table_id,
                            status: state.status,
                        });
                    }
                    let capacity = floor.registry.require(table_id)?.capacity;
                    if let Some(party) = accept.party_size
                        && party > capacity
                    {
                        return Err(FloorError::Validation(format!(
                            "party of {} exceeds table capacity {}",
                            party, capacity
                        )));
                    }

                    let change = StateChange {
                        reservation_id: accept.reservation_id.clone(),
                        party_size: accept.party_size,
                        actor: accept.actor.clone(),
                        ..Default::default()
                    };
                    let (state, changes) =
                        self.transition_locked(&mut floor, table_id, target, &change, now)?;
                    (AcceptedSuggestion::Table { state }, changes)
                }
                SuggestionKind::Combination => {
                    let req = CombinationCreate {
                        table_ids: suggestion.table_ids.clone(),
                        name: None,
                        reservation_id: accept.reservation_id.clone(),
                        party_size: accept.party_size,
                        seat_now: accept.seat_now,
                        actor: accept.actor.clone(),
                    };
                    let (created, changes) =
                        self.create_combination_locked(&mut floor, &req, now)?;
                    (AcceptedSuggestion::Combination(created), changes)
                }
            }
        };

        self.publish(changes);
        Ok(accepted)
    }

    // ========== Timers ==========

    /// Recompute every running timer
    pub fn tick(&self, now: i64) -> Vec<UrgencyChange> {
        self.floor.write().timers.tick(now)
    }

    // ========== Remote changes ==========

    /// Apply a change that happened on another node
    ///
    /// Last write wins: the event is applied only when its `(timestamp,
    /// version)` is newer than the local record's `(updated_at, version)`.
    /// Returns `false` for stale events. Membership of combined tables moves
    /// only through combination events, which carry the member states.
    pub fn apply_remote(&self, event: &FeedEvent) -> FloorResult<bool> {
        let now = now_millis();
        let write = {
            let mut floor = self.floor.write();
            let write = match event.entity {
                FeedEntity::Table => remote_table(&floor, event)?,
                FeedEntity::TableState => remote_state(&floor, event)?,
                FeedEntity::Combination => remote_combination(&floor, event)?,
            };
            let Some(write) = write else {
                return Ok(false);
            };
            self.persist_and_apply(&mut floor, &write, now)?;
            write
        };

        tracing::debug!(
            entity = %event.entity,
            id = event.id,
            version = event.version,
            origin = event.origin.as_deref().unwrap_or("-"),
            "Applied remote change"
        );
        let _ = self.event_tx.send(FloorChange {
            action: "synced",
            event: event.clone(),
        });
        // A table first seen here also gets its fresh state announced
        if event.entity == FeedEntity::Table {
            let fresh: Vec<FloorChange> = write
                .states
                .iter()
                .map(|s| {
                    self.change(
                        FeedEntity::TableState,
                        s.table_id,
                        s.version,
                        s.updated_at,
                        s,
                        "created",
                    )
                })
                .collect();
            self.publish(fresh);
        }
        Ok(true)
    }

    // ========== Internals ==========

    /// Commit to redb, then swap into memory
    fn persist_and_apply(
        &self,
        floor: &mut FloorState,
        write: &FloorWrite,
        now: i64,
    ) -> FloorResult<()> {
        self.storage.commit(write)?;

        for table in &write.tables {
            floor.registry.insert(table.clone());
        }
        for state in &write.states {
            floor
                .timers
                .sync(state, self.config.default_occupancy_secs, now);
            floor.states.insert(state.clone());
        }
        for combination in &write.combinations {
            floor
                .combinations
                .insert(combination.id, combination.clone());
        }
        Ok(())
    }

    fn change<T: Serialize>(
        &self,
        entity: FeedEntity,
        id: i64,
        version: u64,
        timestamp: i64,
        record: &T,
        action: &'static str,
    ) -> FloorChange {
        let payload = serde_json::to_value(record).unwrap_or_else(|e| {
            tracing::error!(entity = %entity, id, error = %e, "Failed to serialize change");
            serde_json::Value::Null
        });
        FloorChange {
            action,
            event: FeedEvent::new(entity, id, version, timestamp, payload)
                .with_origin(self.node_id.clone()),
        }
    }

    fn changes(&self, write: &FloorWrite, action: &'static str) -> Vec<FloorChange> {
        let mut changes = Vec::new();
        for table in &write.tables {
            changes.push(self.change(
                FeedEntity::Table,
                table.id,
                table.version,
                table.updated_at,
                table,
                action,
            ));
        }
        for state in &write.states {
            let action = if write.tables.is_empty() { action } else { "created" };
            changes.push(self.change(
                FeedEntity::TableState,
                state.table_id,
                state.version,
                state.updated_at,
                state,
                action,
            ));
        }
        changes
    }

    /// Combination event (with members) followed by one event per member
    fn combination_changes(
        &self,
        planned: &CombinationChange,
        action: &'static str,
    ) -> Vec<FloorChange> {
        let combination = &planned.combination;
        let mut changes = vec![self.change(
            FeedEntity::Combination,
            combination.id,
            combination.version,
            combination.updated_at,
            planned,
            action,
        )];
        for state in &planned.members {
            changes.push(self.change(
                FeedEntity::TableState,
                state.table_id,
                state.version,
                state.updated_at,
                state,
                "updated",
            ));
        }
        changes
    }

    fn publish(&self, changes: Vec<FloorChange>) {
        for change in changes {
            // No subscriber is fine
            let _ = self.event_tx.send(change);
        }
    }
}

fn combination_write(planned: &CombinationChange) -> FloorWrite {
    FloorWrite {
        tables: Vec::new(),
        states: planned.members.clone(),
        combinations: vec![planned.combination.clone()],
    }
}

fn parse_payload<T: DeserializeOwned>(event: &FeedEvent) -> FloorResult<T> {
    serde_json::from_value(event.payload.clone()).map_err(|e| {
        FloorError::Validation(format!("invalid {} payload: {}", event.entity, e))
    })
}

/// `(timestamp, version)` strictly newer than the local record
///
/// Timestamp decides; versions come from different counters and only break
/// exact ties.
fn is_newer(event: &FeedEvent, local: Option<(i64, u64)>) -> bool {
    match local {
        Some(local) => (event.timestamp, event.version) > local,
        None => true,
    }
}

/// Local version after absorbing a remote record
///
/// Never goes backwards, so `expected_version` holders from before the
/// remote write are rejected.
fn absorbed_version(local: Option<u64>, remote: u64) -> u64 {
    match local {
        Some(local) => (local + 1).max(remote),
        None => remote,
    }
}

fn remote_table(floor: &FloorState, event: &FeedEvent) -> FloorResult<Option<FloorWrite>> {
    let mut table: DiningTable = parse_payload(event)?;
    if table.id != event.id {
        return Err(FloorError::Validation(format!(
            "event id {} does not match table {}",
            event.id, table.id
        )));
    }
    if table.capacity == 0 {
        return Err(FloorError::Validation(
            "capacity must be greater than 0".to_string(),
        ));
    }

    let local = floor.registry.get(table.id);
    if !is_newer(event, local.map(|t| (t.updated_at, t.version))) {
        return Ok(None);
    }
    if let Some(local) = local
        && let Some(combination) = floor.combination_of(local.id)
        && (table.capacity != local.capacity || !table.combinable || !table.is_active)
    {
        return Err(FloorError::CombinationConflict {
            table_id: local.id,
            combination_id: combination.id,
        });
    }

    table.version = absorbed_version(local.map(|t| t.version), event.version);
    table.updated_at = event.timestamp;
    let mut write = FloorWrite::default();
    if floor.states.get(table.id).is_none() {
        write.states.push(TableState::new(table.id, event.timestamp));
    }
    write.tables.push(table);
    Ok(Some(write))
}

fn remote_state(floor: &FloorState, event: &FeedEvent) -> FloorResult<Option<FloorWrite>> {
    let mut state: TableState = parse_payload(event)?;
    if state.table_id != event.id {
        return Err(FloorError::Validation(format!(
            "event id {} does not match table {}",
            event.id, state.table_id
        )));
    }
    floor.registry.require(state.table_id)?;

    let local = floor.states.get(state.table_id);
    if !is_newer(event, local.map(|s| (s.updated_at, s.version))) {
        return Ok(None);
    }

    let combined = floor
        .combination_of(state.table_id)
        .map(|c| (c.id, c.status));
    match (combined, state.combination_id) {
        (None, None) => {}
        (Some((id, status)), Some(incoming)) if id == incoming && status == state.status => {}
        (Some((id, _)), _) | (None, Some(id)) => {
            return Err(FloorError::CombinationConflict {
                table_id: state.table_id,
                combination_id: id,
            });
        }
    }

    state.version = absorbed_version(local.map(|s| s.version), event.version);
    state.updated_at = event.timestamp;
    Ok(Some(FloorWrite {
        states: vec![state],
        ..Default::default()
    }))
}

fn remote_combination(floor: &FloorState, event: &FeedEvent) -> FloorResult<Option<FloorWrite>> {
    let CombinationChange {
        mut combination,
        members,
    } = parse_payload(event)?;
    if combination.id != event.id {
        return Err(FloorError::Validation(format!(
            "event id {} does not match combination {}",
            event.id, combination.id
        )));
    }
    let member_ids = combination.member_ids();
    if member_ids.len() < 2 {
        return Err(FloorError::InsufficientTables(member_ids.len()));
    }

    let local = floor.combinations.get(&combination.id);
    if !is_newer(event, local.map(|c| (c.updated_at, c.version))) {
        return Ok(None);
    }

    let mut capacity = 0;
    let mut states = Vec::with_capacity(member_ids.len());
    for &table_id in &member_ids {
        let table = floor.registry.require(table_id)?;
        capacity += table.capacity;

        let other = floor
            .combination_of(table_id)
            .filter(|c| c.id != combination.id);
        if let Some(other) = other {
            if combination.is_active {
                return Err(FloorError::AlreadyCombined {
                    table_id,
                    combination_id: other.id,
                });
            }
            // Dissolving an old combination must not pull a table out of a newer one
            continue;
        }

        let mut state = members
            .iter()
            .find(|s| s.table_id == table_id)
            .cloned()
            .or_else(|| floor.states.get(table_id).cloned())
            .ok_or(FloorError::TableNotFound(table_id))?;
        if combination.is_active {
            state.combination_id = Some(combination.id);
            state.status = combination.status;
        } else {
            state.combination_id = None;
        }
        state.version = absorbed_version(
            floor.states.get(table_id).map(|s| s.version),
            state.version,
        );
        states.push(state);
    }

    if combination.capacity != capacity {
        tracing::warn!(
            combination_id = combination.id,
            remote = combination.capacity,
            local = capacity,
            "Remote combination capacity differs from member tables, using local sum"
        );
        combination.capacity = capacity;
    }
    combination.version = absorbed_version(local.map(|c| c.version), event.version);
    combination.updated_at = event.timestamp;

    Ok(Some(FloorWrite {
        tables: Vec::new(),
        states,
        combinations: vec![combination],
    }))
}
