use super::*;
use std::sync::Arc;

use shared::message::{FeedEntity, FeedEvent};
use shared::models::TableState;
use shared::util::now_millis;

/// Node `a` produces changes, node `b` consumes them through its adapter
fn two_nodes() -> (FloorEngine, Arc<FloorEngine>, ChangeFeedAdapter) {
    let a = create_test_engine_with(FloorConfig::default(), "node-a");
    let b = Arc::new(create_test_engine_with(FloorConfig::default(), "node-b"));
    let feed = ChangeFeedAdapter::new(b.clone());
    (a, b, feed)
}

fn replicate(
    rx: &mut tokio::sync::broadcast::Receiver<FloorChange>,
    feed: &ChangeFeedAdapter,
) -> Vec<FeedOutcome> {
    drain(rx)
        .iter()
        .map(|c| feed.apply(&c.event).unwrap())
        .collect()
}

#[test]
fn test_remote_changes_applied() {
    let (a, b, feed) = two_nodes();
    let mut rx = a.subscribe();

    let table = add_table(&a, 1, 4);
    replicate(&mut rx, &feed);
    assert_eq!(b.get_table(table.id).unwrap(), table);

    seat(&a, table.id, 2);
    let outcomes = replicate(&mut rx, &feed);
    assert_eq!(outcomes, vec![FeedOutcome::Applied]);

    let state = b.get_state(table.id).unwrap();
    assert_eq!(state, a.get_state(table.id).unwrap());
    assert_eq!(state.status, TableStatus::Occupied);
    // Remote seating starts a local timer
    assert!(b.timer(table.id).is_some());
}

#[test]
fn test_redelivery_is_duplicate() {
    let (a, _b, feed) = two_nodes();
    let mut rx = a.subscribe();
    let table = add_table(&a, 1, 4);
    replicate(&mut rx, &feed);

    seat(&a, table.id, 2);
    let events = drain(&mut rx);
    let event = &events[0].event;

    assert_eq!(feed.apply(event).unwrap(), FeedOutcome::Applied);
    assert_eq!(feed.apply(event).unwrap(), FeedOutcome::Duplicate);
}

#[test]
fn test_out_of_order_older_event_is_stale() {
    let (a, b, feed) = two_nodes();
    let mut rx = a.subscribe();
    let table = add_table(&a, 1, 4);
    replicate(&mut rx, &feed);

    seat(&a, table.id, 2);
    a.set_state(table.id, TableStatus::Cleaning, StateChange::default())
        .unwrap();
    let events = drain(&mut rx);
    assert_eq!(events.len(), 2);

    assert_eq!(feed.apply(&events[1].event).unwrap(), FeedOutcome::Applied);
    assert_eq!(feed.apply(&events[0].event).unwrap(), FeedOutcome::Stale);
    assert_eq!(b.get_state(table.id).unwrap().status, TableStatus::Cleaning);
}

#[test]
fn test_own_events_ignored() {
    let engine = Arc::new(create_test_engine());
    let feed = ChangeFeedAdapter::new(engine.clone());
    let mut rx = engine.subscribe();
    add_table(&engine, 1, 4);

    for change in drain(&mut rx) {
        assert_eq!(feed.apply(&change.event).unwrap(), FeedOutcome::OwnEcho);
    }
    assert_eq!(feed.tracked(), 0);
}

#[test]
fn test_local_newer_change_wins() {
    let (a, b, feed) = two_nodes();
    let mut rx = a.subscribe();
    let table = add_table(&a, 1, 4);
    replicate(&mut rx, &feed);

    // a changes first, b changes later; both reach version 2
    seat(&a, table.id, 2);
    b.set_state(table.id, TableStatus::Reserved, StateChange::default())
        .unwrap();

    let outcomes = replicate(&mut rx, &feed);
    assert_eq!(outcomes, vec![FeedOutcome::Stale]);
    assert_eq!(b.get_state(table.id).unwrap().status, TableStatus::Reserved);
}

#[test]
fn test_remote_combination_moves_members() {
    let (a, b, feed) = two_nodes();
    let mut rx = a.subscribe();
    let (x, y) = add_adjacent_pair(&a, (1, 2), 4);
    replicate(&mut rx, &feed);

    let created = combine(&a, vec![x.id, y.id], false);
    let outcomes = replicate(&mut rx, &feed);
    assert_eq!(outcomes[0], FeedOutcome::Applied);

    let remote = b.get_combination(created.combination.id).unwrap();
    assert!(remote.is_active);
    assert_eq!(remote.capacity, 8);
    for id in [x.id, y.id] {
        let state = b.get_state(id).unwrap();
        assert_eq!(state.combination_id, Some(created.combination.id));
        assert_eq!(state.status, TableStatus::Reserved);
    }

    dissolve(&a, created.combination.id, None);
    replicate(&mut rx, &feed);
    assert!(b.list_combinations(true).is_empty());
    for id in [x.id, y.id] {
        let state = b.get_state(id).unwrap();
        assert!(state.combination_id.is_none());
        assert_eq!(state.status, TableStatus::Free);
    }
}

#[test]
fn test_remote_state_cannot_split_combination() {
    let (a, b, feed) = two_nodes();
    let mut rx = a.subscribe();
    let (x, y) = add_adjacent_pair(&a, (1, 2), 4);
    replicate(&mut rx, &feed);
    let local = combine(&b, vec![x.id, y.id], false);

    let mut state = TableState::new(x.id, now_millis());
    state.status = TableStatus::Occupied;
    let event = FeedEvent::new(
        FeedEntity::TableState,
        x.id,
        10,
        now_millis() + 60_000,
        serde_json::to_value(&state).unwrap(),
    )
    .with_origin("node-a");

    let err = feed.apply(&event).unwrap_err();
    assert!(matches!(
        err,
        FloorError::CombinationConflict { combination_id, .. } if combination_id == local.combination.id
    ));
    assert_eq!(b.get_state(x.id).unwrap().status, TableStatus::Reserved);
}

#[test]
fn test_malformed_payload_rejected() {
    let (_a, b, feed) = two_nodes();
    let event = FeedEvent::new(
        FeedEntity::Table,
        1,
        1,
        now_millis(),
        serde_json::json!({"id": 1, "number": "uno"}),
    )
    .with_origin("node-a");

    assert!(matches!(
        feed.apply(&event).unwrap_err(),
        FloorError::Validation(_)
    ));
    assert_eq!(b.stats().tables, 0);
}

#[test]
fn test_state_for_unknown_table_rejected() {
    let (_a, _b, feed) = two_nodes();
    let state = TableState::new(77, now_millis());
    let event = FeedEvent::new(
        FeedEntity::TableState,
        77,
        1,
        now_millis(),
        serde_json::to_value(&state).unwrap(),
    );
    assert!(matches!(
        feed.apply(&event).unwrap_err(),
        FloorError::TableNotFound(77)
    ));
}

fn state_event(state: &TableState, version: u64, timestamp: i64, origin: &str) -> FeedEvent {
    FeedEvent::new(
        FeedEntity::TableState,
        state.table_id,
        version,
        timestamp,
        serde_json::to_value(state).unwrap(),
    )
    .with_origin(origin)
}

#[test]
fn test_newer_timestamp_wins_over_higher_version() {
    let engine = Arc::new(create_test_engine());
    let feed = ChangeFeedAdapter::new(engine.clone());
    let table = add_table(&engine, 1, 4);
    let now = now_millis();

    let mut reserved = TableState::new(table.id, now + 1_000);
    reserved.status = TableStatus::Reserved;
    let mut closed = TableState::new(table.id, now + 2_000);
    closed.status = TableStatus::OutOfService;

    // Peers count versions independently
    let first = feed.apply(&state_event(&reserved, 5, now + 1_000, "node-c"));
    let second = feed.apply(&state_event(&closed, 4, now + 2_000, "node-d"));

    assert_eq!(first.unwrap(), FeedOutcome::Applied);
    assert_eq!(second.unwrap(), FeedOutcome::Applied);
    assert_eq!(
        engine.get_state(table.id).unwrap().status,
        TableStatus::OutOfService
    );

    // The older write arriving again stays out
    let late = feed.apply(&state_event(&reserved, 5, now + 1_000, "node-c"));
    assert_eq!(late.unwrap(), FeedOutcome::Stale);
    assert_eq!(
        engine.get_state(table.id).unwrap().status,
        TableStatus::OutOfService
    );
}

#[test]
fn test_remote_write_never_lowers_local_version() {
    let engine = Arc::new(create_test_engine());
    let feed = ChangeFeedAdapter::new(engine.clone());
    let table = add_table(&engine, 1, 4);
    let read_version = engine.get_state(table.id).unwrap().version;

    seat(&engine, table.id, 2);
    engine
        .set_state(table.id, TableStatus::Cleaning, StateChange::default())
        .unwrap();
    let before = engine.get_state(table.id).unwrap().version;
    assert_eq!(before, read_version + 2);

    let remote = TableState::new(table.id, now_millis() + 60_000);
    let outcome = feed
        .apply(&state_event(&remote, read_version, remote.updated_at, "node-c"))
        .unwrap();
    assert_eq!(outcome, FeedOutcome::Applied);

    let after = engine.get_state(table.id).unwrap();
    assert_eq!(after.status, TableStatus::Free);
    assert!(after.version > before);

    // A client still holding the first read must be told to reload
    let err = engine
        .set_state(
            table.id,
            TableStatus::Occupied,
            StateChange {
                expected_version: Some(read_version),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        FloorError::ConcurrentModification { expected, actual, .. }
            if expected == read_version && actual == after.version
    ));

    let seated = engine
        .set_state(
            table.id,
            TableStatus::Occupied,
            StateChange {
                expected_version: Some(after.version),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(seated.version, after.version + 1);
}

#[test]
fn test_remote_table_edit_keeps_version_increasing() {
    let engine = Arc::new(create_test_engine());
    let feed = ChangeFeedAdapter::new(engine.clone());
    let table = add_table(&engine, 1, 4);
    let mut req = edit_of(&table);
    req.capacity = 6;
    let local = engine.upsert_table(req).unwrap();

    let mut remote = table.clone();
    remote.capacity = 8;
    let event = FeedEvent::new(
        FeedEntity::Table,
        table.id,
        1,
        now_millis() + 60_000,
        serde_json::to_value(&remote).unwrap(),
    )
    .with_origin("node-c");

    assert_eq!(feed.apply(&event).unwrap(), FeedOutcome::Applied);
    let stored = engine.get_table(table.id).unwrap();
    assert_eq!(stored.capacity, 8);
    assert!(stored.version > local.version);
}

#[test]
fn test_adapter_debug_shows_node() {
    let (_a, _b, feed) = two_nodes();
    let debug = format!("{:?}", feed);
    assert!(debug.contains("ChangeFeedAdapter"));
    assert!(debug.contains("node-b"));
}
