//! Table Combination Model (拼桌)

use serde::{Deserialize, Serialize};

use super::table_state::{TableState, TableStatus};

/// Two or more tables merged into one seating unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combination {
    pub id: i64,
    pub name: String,
    pub principal_table_id: i64,
    pub secondary_table_ids: Vec<i64>,
    /// Sum of member capacities
    pub capacity: u32,
    pub is_active: bool,
    pub reservation_id: Option<String>,
    /// Mirrors every member's status while active
    pub status: TableStatus,
    /// False when members are not adjacent or too far apart
    #[serde(rename = "es_optima", alias = "is_optimal")]
    pub is_optimal: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub version: u64,
}

impl Combination {
    /// Principal first, then secondaries in caller order
    pub fn member_ids(&self) -> Vec<i64> {
        let mut ids = Vec::with_capacity(1 + self.secondary_table_ids.len());
        ids.push(self.principal_table_id);
        ids.extend_from_slice(&self.secondary_table_ids);
        ids
    }

    pub fn contains(&self, table_id: i64) -> bool {
        self.principal_table_id == table_id || self.secondary_table_ids.contains(&table_id)
    }
}

/// Create combination payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinationCreate {
    /// First element becomes the principal table
    pub table_ids: Vec<i64>,
    pub name: Option<String>,
    pub reservation_id: Option<String>,
    pub party_size: Option<u32>,
    /// Seat immediately (`ocupada`) instead of holding (`reservada`)
    #[serde(default)]
    pub seat_now: bool,
    pub actor: Option<String>,
}

/// Dissolve combination payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinationDissolve {
    /// Status every former member is reset to (default `libre`)
    pub resulting_status: Option<TableStatus>,
    pub actor: Option<String>,
}

/// A combination together with the member states it changed
///
/// Returned by create/state/dissolve and carried as the change feed payload
/// for combination events, so members move atomically on every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationChange {
    pub combination: Combination,
    pub members: Vec<TableState>,
}
