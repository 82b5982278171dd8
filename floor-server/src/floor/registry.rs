//! Table registry (桌台登记)
//!
//! In-memory view of the physical tables. Mutations here are pure: they
//! build the next record and leave committing to the engine.

use std::collections::HashMap;

use shared::models::{DiningTable, DiningTableUpsert, TableFilter};
use shared::util::snowflake_id;

use super::error::{FloorError, FloorResult};
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text};

#[derive(Debug, Default)]
pub struct TableRegistry {
    tables: HashMap<i64, DiningTable>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: i64) -> Option<&DiningTable> {
        self.tables.get(&id)
    }

    pub fn require(&self, id: i64) -> FloorResult<&DiningTable> {
        self.tables.get(&id).ok_or(FloorError::TableNotFound(id))
    }

    /// Filtered, ordered by table number
    pub fn list(&self, filter: &TableFilter) -> Vec<DiningTable> {
        let mut tables: Vec<DiningTable> = self
            .tables
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        tables.sort_by_key(|t| (t.number, t.id));
        tables
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiningTable> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn fresh_id(&self) -> i64 {
        let mut id = snowflake_id();
        while self.tables.contains_key(&id) {
            id = snowflake_id();
        }
        id
    }

    pub fn insert(&mut self, table: DiningTable) {
        self.tables.insert(table.id, table);
    }

    /// Build the record an upsert would store
    ///
    /// Checks the request on its own merits (capacity, number uniqueness
    /// among active tables, adjacency references). Combination rules are
    /// checked by the caller, which knows the combination state.
    pub fn prepare_upsert(&self, req: &DiningTableUpsert, now: i64) -> FloorResult<DiningTable> {
        if req.capacity == 0 {
            return Err(FloorError::Validation(
                "capacity must be greater than 0".to_string(),
            ));
        }
        if req.number == 0 {
            return Err(FloorError::Validation(
                "table number must be greater than 0".to_string(),
            ));
        }
        validate_optional_text(&req.name, "name", MAX_NAME_LEN)
            .map_err(FloorError::Validation)?;

        let existing = match req.id {
            Some(id) => Some(self.require(id)?),
            None => None,
        };
        let id = match existing {
            Some(t) => t.id,
            None => self.fresh_id(),
        };

        if req.is_active
            && let Some(clash) = self
                .tables
                .values()
                .find(|t| t.id != id && t.is_active && t.number == req.number)
        {
            return Err(FloorError::Validation(format!(
                "table number {} is already used by table {}",
                req.number, clash.id
            )));
        }

        let mut adjacent = Vec::with_capacity(req.adjacent.len());
        for other in &req.adjacent {
            if *other == id {
                return Err(FloorError::Validation(
                    "a table cannot be adjacent to itself".to_string(),
                ));
            }
            if !self.tables.contains_key(other) {
                return Err(FloorError::Validation(format!(
                    "adjacent table {} does not exist",
                    other
                )));
            }
            if !adjacent.contains(other) {
                adjacent.push(*other);
            }
        }

        Ok(DiningTable {
            id,
            number: req.number,
            name: req.name.as_ref().map(|n| n.trim().to_string()),
            capacity: req.capacity,
            zone: req.zone,
            position: req.position,
            combinable: req.combinable,
            is_active: req.is_active,
            adjacent,
            version: existing.map(|t| t.version + 1).unwrap_or(1),
            updated_at: now,
        })
    }
}
