use super::*;
use shared::models::Urgency;
use shared::util::now_millis;

const MIN: i64 = 60_000;

#[test]
fn test_seating_starts_timer() {
    let engine = create_test_engine();
    let table = add_table(&engine, 1, 4);
    assert!(engine.timer(table.id).is_none());

    seat(&engine, table.id, 2);
    let timer = engine.timer(table.id).unwrap();
    assert!(timer.is_active);
    assert_eq!(timer.expected_secs, 7200);
    assert_eq!(timer.urgency, Urgency::Green);
    assert_eq!(
        Some(timer.occupied_at),
        engine.get_state(table.id).unwrap().occupied_at
    );
}

#[test]
fn test_estimated_release_sets_expected_duration() {
    let engine = create_test_engine();
    let table = add_table(&engine, 1, 4);
    let state = engine
        .set_state(
            table.id,
            TableStatus::Occupied,
            StateChange {
                estimated_release: Some(now_millis() + 90 * MIN + 30_000),
                ..Default::default()
            },
        )
        .unwrap();

    let timer = engine.timer(table.id).unwrap();
    let occupied_at = state.occupied_at.unwrap();
    let release = state.estimated_release.unwrap();
    assert_eq!(timer.expected_secs, ((release - occupied_at) / 1000) as u64);
}

#[test]
fn test_leaving_occupied_stops_timer() {
    let engine = create_test_engine();
    let table = add_table(&engine, 1, 4);
    seat(&engine, table.id, 2);

    engine
        .set_state(table.id, TableStatus::Cleaning, StateChange::default())
        .unwrap();
    assert!(engine.timer(table.id).is_none());
    assert!(engine.timers().is_empty());
}

#[test]
fn test_tick_reports_tier_changes() {
    let engine = create_test_engine();
    let table = add_table(&engine, 1, 4);
    seat(&engine, table.id, 2);
    let occupied_at = engine.timer(table.id).unwrap().occupied_at;

    assert!(engine.tick(occupied_at + 60 * MIN).is_empty());

    let amber = engine.tick(occupied_at + 90 * MIN);
    assert_eq!(amber.len(), 1);
    assert_eq!(amber[0].from, Urgency::Green);
    assert_eq!(amber[0].to, Urgency::Amber);

    let red = engine.tick(occupied_at + 125 * MIN);
    assert_eq!(red[0].to, Urgency::Red);
    assert_eq!(red[0].elapsed_secs, 125 * 60);
    assert_eq!(engine.timer(table.id).unwrap().urgency, Urgency::Red);

    // Still red, nothing new to report
    assert!(engine.tick(occupied_at + 130 * MIN).is_empty());
}

#[test]
fn test_custom_default_duration() {
    let config = FloorConfig {
        default_occupancy_secs: 3600,
        ..Default::default()
    };
    let engine = create_test_engine_with(config, TEST_NODE);
    let table = add_table(&engine, 1, 4);
    seat(&engine, table.id, 2);
    assert_eq!(engine.timer(table.id).unwrap().expected_secs, 3600);
}

#[test]
fn test_timers_rebuilt_on_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("floor.redb");
    let (table_id, occupied_at) = {
        let engine = FloorEngine::open(
            crate::storage::FloorStorage::open(&path).unwrap(),
            FloorConfig::default(),
            TEST_NODE,
        )
        .unwrap();
        let table = add_table(&engine, 1, 4);
        let idle = add_table(&engine, 2, 4);
        seat(&engine, table.id, 2);
        assert!(engine.timer(idle.id).is_none());
        (table.id, engine.timer(table.id).unwrap().occupied_at)
    };

    let engine = FloorEngine::open(
        crate::storage::FloorStorage::open(&path).unwrap(),
        FloorConfig::default(),
        TEST_NODE,
    )
    .unwrap();
    assert_eq!(engine.timers().len(), 1);
    let timer = engine.timer(table_id).unwrap();
    assert_eq!(timer.occupied_at, occupied_at);
    assert_eq!(timer.expected_secs, 7200);
}

#[test]
fn test_snapshot_skips_timers_of_inactive_tables() {
    let engine = create_test_engine();
    let kept = add_table(&engine, 1, 4);
    let retired = add_table(&engine, 2, 4);
    seat(&engine, kept.id, 2);
    seat(&engine, retired.id, 3);

    engine.deactivate_table(retired.id).unwrap();

    let snapshot = engine.snapshot();
    let timed: Vec<i64> = snapshot.timers.iter().map(|t| t.table_id).collect();
    assert_eq!(timed, vec![kept.id]);
    assert!(snapshot.tables.iter().all(|t| t.id != retired.id));
}
