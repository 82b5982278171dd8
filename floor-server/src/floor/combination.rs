//! Combination planning (拼桌)
//!
//! Builds the full set of records a create / state change / dissolve would
//! write. Every precondition is checked before anything is produced, so a
//! failing member aborts the whole operation with no partial effects.

use std::collections::HashSet;

use shared::models::{
    Combination, CombinationChange, CombinationCreate, CombinationDissolve, DiningTable,
    StateChange, TableStatus,
};
use shared::util::snowflake_id;

use super::FloorState;
use super::error::{FloorError, FloorResult};
use super::state_store::{apply_status, check_version, validate_change};
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text};

/// Largest distance between any two members
pub fn max_pairwise_distance(members: &[&DiningTable]) -> f64 {
    let mut max = 0.0_f64;
    for (i, a) in members.iter().enumerate() {
        for b in &members[i + 1..] {
            max = max.max(a.position.distance_to(&b.position));
        }
    }
    max
}

/// True when the members form one connected group in the adjacency graph
pub fn adjacency_connected(members: &[&DiningTable]) -> bool {
    if members.len() < 2 {
        return true;
    }
    let mut reached = vec![false; members.len()];
    let mut stack = vec![0];
    reached[0] = true;
    while let Some(i) = stack.pop() {
        for (j, other) in members.iter().enumerate() {
            if !reached[j] && members[i].is_adjacent_to(other) {
                reached[j] = true;
                stack.push(j);
            }
        }
    }
    reached.into_iter().all(|r| r)
}

/// Adjacency data or the distance threshold confirms the members touch
pub fn adjacency_confirmed(members: &[&DiningTable], max_distance: Option<f64>) -> bool {
    adjacency_connected(members)
        || max_distance.is_some_and(|d| max_pairwise_distance(members) <= d)
}

/// Advisory `es_optima` flag
///
/// Only the constraints that are actually configured can make a
/// combination non-optimal: adjacency when any member carries adjacency
/// data, distance when a maximum is set.
pub fn is_optimal(members: &[&DiningTable], max_distance: Option<f64>) -> bool {
    let has_adjacency = members.iter().any(|t| !t.adjacent.is_empty());
    if has_adjacency && !adjacency_connected(members) {
        return false;
    }
    if let Some(d) = max_distance
        && max_pairwise_distance(members) > d
    {
        return false;
    }
    true
}

/// `"Mesa 1+2+3"`
pub fn default_name(members: &[&DiningTable]) -> String {
    let numbers: Vec<String> = members.iter().map(|t| t.number.to_string()).collect();
    format!("Mesa {}", numbers.join("+"))
}

fn fresh_id(floor: &FloorState) -> i64 {
    let mut id = snowflake_id();
    while floor.combinations.contains_key(&id) {
        id = snowflake_id();
    }
    id
}

/// Plan a new combination
///
/// Member checks run in caller order: unknown or inactive table, not
/// combinable, already in an active combination, not `libre`.
pub fn plan_create(
    floor: &FloorState,
    req: &CombinationCreate,
    max_distance: Option<f64>,
    now: i64,
) -> FloorResult<CombinationChange> {
    if req.table_ids.len() < 2 {
        return Err(FloorError::InsufficientTables(req.table_ids.len()));
    }
    let mut seen = HashSet::with_capacity(req.table_ids.len());
    if let Some(dup) = req.table_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(FloorError::Validation(format!(
            "table {} appears more than once",
            dup
        )));
    }
    validate_optional_text(&req.name, "name", MAX_NAME_LEN).map_err(FloorError::Validation)?;

    let mut members = Vec::with_capacity(req.table_ids.len());
    for &id in &req.table_ids {
        let state = floor.active_state(id)?;
        let table = floor.registry.require(id)?;
        if !table.combinable {
            return Err(FloorError::NotCombinable(id));
        }
        if let Some(combination_id) = state.combination_id {
            return Err(FloorError::AlreadyCombined {
                table_id: id,
                combination_id,
            });
        }
        if state.status != TableStatus::Free {
            return Err(FloorError::TableNotFree {
                table_id: id,
                status: state.status,
            });
        }
        members.push(table);
    }

    let capacity: u32 = members.iter().map(|t| t.capacity).sum();
    match req.party_size {
        Some(0) => {
            return Err(FloorError::Validation(
                "party_size must be greater than 0".to_string(),
            ));
        }
        Some(party) if party > capacity => {
            return Err(FloorError::Validation(format!(
                "party of {} exceeds combined capacity {}",
                party, capacity
            )));
        }
        _ => {}
    }

    let status = if req.seat_now {
        TableStatus::Occupied
    } else {
        TableStatus::Reserved
    };
    let id = fresh_id(floor);
    let name = match req.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => default_name(&members),
    };

    let combination = Combination {
        id,
        name,
        principal_table_id: req.table_ids[0],
        secondary_table_ids: req.table_ids[1..].to_vec(),
        capacity,
        is_active: true,
        reservation_id: req.reservation_id.clone(),
        status,
        is_optimal: is_optimal(&members, max_distance),
        created_at: now,
        updated_at: now,
        version: 1,
    };

    let mut member_states = Vec::with_capacity(members.len());
    for (i, table) in members.iter().enumerate() {
        let change = StateChange {
            reservation_id: req.reservation_id.clone(),
            // The party is recorded once, on the principal
            party_size: if i == 0 { req.party_size } else { None },
            actor: req.actor.clone(),
            ..Default::default()
        };
        let mut state = floor.states.require(table.id)?.clone();
        apply_status(&mut state, status, &change, now);
        state.combination_id = Some(id);
        member_states.push(state);
    }

    Ok(CombinationChange {
        combination,
        members: member_states,
    })
}

/// Plan a state change for every member of an active combination
pub fn plan_state(
    floor: &FloorState,
    id: i64,
    target: TableStatus,
    change: &StateChange,
    now: i64,
) -> FloorResult<CombinationChange> {
    let current = floor.active_combination(id)?;
    check_version("combination", id, current.version, change.expected_version)?;
    if target == TableStatus::Free || !current.status.can_transition_to(target) {
        return Err(FloorError::InvalidTransition {
            entity: "combination",
            id,
            from: current.status,
            to: target,
        });
    }
    validate_change(change)?;

    let mut combination = current.clone();
    combination.status = target;
    if target.is_rest_status() {
        combination.reservation_id = None;
    } else if change.reservation_id.is_some() {
        combination.reservation_id = change.reservation_id.clone();
    }
    combination.updated_at = now;
    combination.version += 1;

    let mut members = Vec::with_capacity(1 + combination.secondary_table_ids.len());
    for (i, table_id) in combination.member_ids().into_iter().enumerate() {
        let mut member_change = change.clone();
        if i > 0 {
            member_change.party_size = None;
        }
        let mut state = floor.states.require(table_id)?.clone();
        apply_status(&mut state, target, &member_change, now);
        members.push(state);
    }

    Ok(CombinationChange {
        combination,
        members,
    })
}

/// Plan the dissolution of an active combination
///
/// Members are forced to the resulting rest status regardless of the
/// transition graph, links and booking data are cleared.
pub fn plan_dissolve(
    floor: &FloorState,
    id: i64,
    req: &CombinationDissolve,
    now: i64,
) -> FloorResult<CombinationChange> {
    let current = floor.active_combination(id)?;
    let resulting = req.resulting_status.unwrap_or(TableStatus::Free);
    if !resulting.is_rest_status() {
        return Err(FloorError::Validation(format!(
            "dissolve must leave members libre, limpieza or fuera_servicio, got {}",
            resulting
        )));
    }

    let mut combination = current.clone();
    combination.is_active = false;
    combination.status = resulting;
    combination.reservation_id = None;
    combination.updated_at = now;
    combination.version += 1;

    let change = StateChange {
        actor: req.actor.clone(),
        ..Default::default()
    };
    let mut members = Vec::with_capacity(1 + combination.secondary_table_ids.len());
    for table_id in combination.member_ids() {
        let mut state = floor.states.require(table_id)?.clone();
        state.combination_id = None;
        apply_status(&mut state, resulting, &change, now);
        members.push(state);
    }

    Ok(CombinationChange {
        combination,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Position, Zone};

    fn table(id: i64, number: u32, x: f64, adjacent: Vec<i64>) -> DiningTable {
        DiningTable {
            id,
            number,
            name: None,
            capacity: 4,
            zone: Zone::Interior,
            position: Position::new(x, 0.0),
            combinable: true,
            is_active: true,
            adjacent,
            version: 1,
            updated_at: 0,
        }
    }

    #[test]
    fn test_adjacency_chain_is_connected() {
        let a = table(1, 1, 0.0, vec![2]);
        let b = table(2, 2, 1.0, vec![]);
        let c = table(3, 3, 2.0, vec![2]);
        assert!(adjacency_connected(&[&a, &b, &c]));

        let d = table(4, 4, 9.0, vec![]);
        assert!(!adjacency_connected(&[&a, &b, &d]));
    }

    #[test]
    fn test_optimal_without_constraints() {
        let a = table(1, 1, 0.0, vec![]);
        let b = table(2, 2, 500.0, vec![]);
        assert!(is_optimal(&[&a, &b], None));
        assert!(!is_optimal(&[&a, &b], Some(100.0)));
    }

    #[test]
    fn test_not_adjacent_is_not_optimal() {
        let a = table(1, 1, 0.0, vec![5]);
        let b = table(2, 2, 1.0, vec![]);
        assert!(!is_optimal(&[&a, &b], None));
    }

    #[test]
    fn test_distance_confirms_adjacency() {
        let a = table(1, 1, 0.0, vec![]);
        let b = table(2, 2, 80.0, vec![]);
        assert!(!adjacency_confirmed(&[&a, &b], None));
        assert!(adjacency_confirmed(&[&a, &b], Some(100.0)));
        assert_eq!(max_pairwise_distance(&[&a, &b]), 80.0);
    }

    #[test]
    fn test_default_name() {
        let a = table(1, 12, 0.0, vec![]);
        let b = table(2, 3, 1.0, vec![]);
        assert_eq!(default_name(&[&a, &b]), "Mesa 12+3");
    }
}
