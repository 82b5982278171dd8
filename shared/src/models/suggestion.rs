//! Assignment Suggestion Model

use serde::{Deserialize, Serialize};

use super::zone::Zone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Table,
    Combination,
}

/// Scored, non-binding proposal for seating a party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    /// Principal first for combinations
    pub table_ids: Vec<i64>,
    pub table_numbers: Vec<u32>,
    pub capacity: u32,
    /// capacity - party_size
    pub surplus: u32,
    pub zone: Zone,
    /// 0..=100
    pub score: f64,
    /// Largest pairwise distance between members
    pub distance: Option<f64>,
    /// Adjacency data or distance threshold confirms the members touch
    pub adjacency_confirmed: bool,
}

impl Suggestion {
    pub fn table_count(&self) -> usize {
        self.table_ids.len()
    }

    pub fn lowest_number(&self) -> u32 {
        self.table_numbers.iter().copied().min().unwrap_or(u32::MAX)
    }
}

/// Suggestion query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionQuery {
    pub party_size: u32,
    pub zone: Option<Zone>,
    pub limit: Option<usize>,
}

/// Accept a suggestion (re-validated against current state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionAccept {
    pub suggestion: Suggestion,
    pub party_size: Option<u32>,
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub seat_now: bool,
    pub actor: Option<String>,
}
