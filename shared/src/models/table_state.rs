//! Table State Model
//!
//! Operational state of a dining table and the legal transitions between
//! states:
//!
//! | From | To |
//! |------|----|
//! | libre | reservada, ocupada, fuera_servicio |
//! | reservada | ocupada, libre |
//! | ocupada | limpieza, libre |
//! | limpieza | libre, fuera_servicio |
//! | fuera_servicio | libre |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Table service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableStatus {
    #[serde(rename = "libre")]
    Free,
    #[serde(rename = "reservada")]
    Reserved,
    #[serde(rename = "ocupada")]
    Occupied,
    #[serde(rename = "limpieza")]
    Cleaning,
    #[serde(rename = "fuera_servicio")]
    OutOfService,
}

impl TableStatus {
    pub const ALL: [TableStatus; 5] = [
        TableStatus::Free,
        TableStatus::Reserved,
        TableStatus::Occupied,
        TableStatus::Cleaning,
        TableStatus::OutOfService,
    ];

    /// Targets reachable from this status
    pub fn allowed_targets(&self) -> &'static [TableStatus] {
        use TableStatus::*;
        match self {
            Free => &[Reserved, Occupied, OutOfService],
            // Reserved -> Free models a no-show
            Reserved => &[Occupied, Free],
            Occupied => &[Cleaning, Free],
            Cleaning => &[Free, OutOfService],
            OutOfService => &[Free],
        }
    }

    pub fn can_transition_to(&self, target: TableStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Statuses a table may rest in once it no longer serves a party
    pub fn is_rest_status(&self) -> bool {
        matches!(
            self,
            TableStatus::Free | TableStatus::Cleaning | TableStatus::OutOfService
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TableStatus::Free => "libre",
            TableStatus::Reserved => "reservada",
            TableStatus::Occupied => "ocupada",
            TableStatus::Cleaning => "limpieza",
            TableStatus::OutOfService => "fuera_servicio",
        }
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current state of one table (one-to-one with a registered table)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableState {
    pub table_id: i64,
    pub status: TableStatus,
    pub reservation_id: Option<String>,
    pub party_size: Option<u32>,
    /// Estimated release (Unix millis)
    pub estimated_release: Option<i64>,
    pub note: Option<String>,
    /// Set while the table is occupied (Unix millis)
    pub occupied_at: Option<i64>,
    /// Active combination this table belongs to
    pub combination_id: Option<i64>,
    pub updated_at: i64,
    pub updated_by: Option<String>,
    pub version: u64,
}

impl TableState {
    /// Fresh `libre` state for a newly registered table
    pub fn new(table_id: i64, now: i64) -> Self {
        Self {
            table_id,
            status: TableStatus::Free,
            reservation_id: None,
            party_size: None,
            estimated_release: None,
            note: None,
            occupied_at: None,
            combination_id: None,
            updated_at: now,
            updated_by: None,
            version: 1,
        }
    }

    pub fn is_combined(&self) -> bool {
        self.combination_id.is_some()
    }
}

/// State transition request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateChange {
    pub reservation_id: Option<String>,
    pub party_size: Option<u32>,
    pub estimated_release: Option<i64>,
    pub note: Option<String>,
    pub actor: Option<String>,
    /// Optimistic lock: reject if the stored version differs
    pub expected_version: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_graph() {
        use TableStatus::*;
        assert!(Free.can_transition_to(Reserved));
        assert!(Free.can_transition_to(Occupied));
        assert!(Free.can_transition_to(OutOfService));
        assert!(!Free.can_transition_to(Cleaning));
        assert!(!Free.can_transition_to(Free));

        assert!(Reserved.can_transition_to(Free));
        assert!(!Reserved.can_transition_to(Cleaning));

        assert!(Occupied.can_transition_to(Cleaning));
        assert!(!Occupied.can_transition_to(Reserved));

        assert!(Cleaning.can_transition_to(OutOfService));
        assert!(OutOfService.can_transition_to(Free));
        assert!(!OutOfService.can_transition_to(Occupied));
    }

    #[test]
    fn test_status_serde_uses_floor_names() {
        let json = serde_json::to_string(&TableStatus::OutOfService).unwrap();
        assert_eq!(json, "\"fuera_servicio\"");
        let parsed: TableStatus = serde_json::from_str("\"limpieza\"").unwrap();
        assert_eq!(parsed, TableStatus::Cleaning);
    }
}
