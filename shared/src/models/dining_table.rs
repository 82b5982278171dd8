//! Dining Table Model

use serde::{Deserialize, Serialize};

use super::zone::Zone;

/// Position on the floor plan (plan units, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiningTable {
    pub id: i64,
    /// Number painted on the table, unique among active tables
    pub number: u32,
    pub name: Option<String>,
    pub capacity: u32,
    pub zone: Zone,
    pub position: Position,
    pub combinable: bool,
    pub is_active: bool,
    #[serde(default)]
    pub adjacent: Vec<i64>,
    pub version: u64,
    pub updated_at: i64,
}

impl DiningTable {
    /// Display label, e.g. "Mesa 12"
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Mesa {}", self.number),
        }
    }

    /// Adjacency in either direction
    pub fn is_adjacent_to(&self, other: &DiningTable) -> bool {
        self.adjacent.contains(&other.id) || other.adjacent.contains(&self.id)
    }
}

/// Create or update dining table payload
///
/// `id = None` creates a new table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableUpsert {
    pub id: Option<i64>,
    pub number: u32,
    pub name: Option<String>,
    pub capacity: u32,
    pub zone: Zone,
    #[serde(default)]
    pub position: Position,
    #[serde(default = "default_true")]
    pub combinable: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub adjacent: Vec<i64>,
}

fn default_true() -> bool {
    true
}

/// List filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableFilter {
    pub zone: Option<Zone>,
    pub is_active: Option<bool>,
    pub combinable: Option<bool>,
    pub min_capacity: Option<u32>,
}

impl TableFilter {
    pub fn matches(&self, table: &DiningTable) -> bool {
        self.zone.is_none_or(|z| z == table.zone)
            && self.is_active.is_none_or(|a| a == table.is_active)
            && self.combinable.is_none_or(|c| c == table.combinable)
            && self.min_capacity.is_none_or(|c| table.capacity >= c)
    }
}
