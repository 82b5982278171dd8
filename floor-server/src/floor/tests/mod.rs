use super::*;
use shared::models::{
    CombinationChange, CombinationCreate, CombinationDissolve, DiningTable, DiningTableUpsert, Position, StateChange,
    TableStatus, Zone,
};

mod test_concurrency;
mod test_feed;
mod test_timer;

const TEST_NODE: &str = "node-test";

fn create_test_engine() -> FloorEngine {
    FloorEngine::in_memory(FloorConfig::default(), TEST_NODE).unwrap()
}

fn create_test_engine_with(config: FloorConfig, node_id: &str) -> FloorEngine {
    FloorEngine::in_memory(config, node_id).unwrap()
}

fn table_upsert(number: u32, capacity: u32, zone: Zone) -> DiningTableUpsert {
    DiningTableUpsert {
        id: None,
        number,
        name: None,
        capacity,
        zone,
        position: Position::new(number as f64 * 100.0, 0.0),
        combinable: true,
        is_active: true,
        adjacent: vec![],
    }
}

/// Edit payload carrying every field of an existing table
fn edit_of(table: &DiningTable) -> DiningTableUpsert {
    DiningTableUpsert {
        id: Some(table.id),
        number: table.number,
        name: table.name.clone(),
        capacity: table.capacity,
        zone: table.zone,
        position: table.position,
        combinable: table.combinable,
        is_active: table.is_active,
        adjacent: table.adjacent.clone(),
    }
}

fn add_table(engine: &FloorEngine, number: u32, capacity: u32) -> DiningTable {
    engine
        .upsert_table(table_upsert(number, capacity, Zone::Interior))
        .unwrap()
}

fn add_table_in(engine: &FloorEngine, number: u32, capacity: u32, zone: Zone) -> DiningTable {
    engine.upsert_table(table_upsert(number, capacity, zone)).unwrap()
}

/// Two tables where the second declares the first adjacent
fn add_adjacent_pair(
    engine: &FloorEngine,
    numbers: (u32, u32),
    capacity: u32,
) -> (DiningTable, DiningTable) {
    let a = add_table(engine, numbers.0, capacity);
    let mut req = table_upsert(numbers.1, capacity, Zone::Interior);
    req.adjacent = vec![a.id];
    let b = engine.upsert_table(req).unwrap();
    (a, b)
}

fn seat(engine: &FloorEngine, table_id: i64, party: u32) {
    engine
        .set_state(
            table_id,
            TableStatus::Occupied,
            StateChange {
                party_size: Some(party),
                ..Default::default()
            },
        )
        .unwrap();
}

fn combine(engine: &FloorEngine, table_ids: Vec<i64>, seat_now: bool) -> CombinationChange {
    engine
        .create_combination(CombinationCreate {
            table_ids,
            seat_now,
            ..Default::default()
        })
        .unwrap()
}

fn dissolve(engine: &FloorEngine, id: i64, resulting: Option<TableStatus>) -> CombinationChange {
    engine
        .dissolve_combination(
            id,
            CombinationDissolve {
                resulting_status: resulting,
                actor: None,
            },
        )
        .unwrap()
}

/// Drain every change published so far
fn drain(rx: &mut tokio::sync::broadcast::Receiver<FloorChange>) -> Vec<FloorChange> {
    let mut out = Vec::new();
    while let Ok(change) = rx.try_recv() {
        out.push(change);
    }
    out
}
