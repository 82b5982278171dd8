use super::*;
use std::sync::{Arc, Barrier};
use std::thread;

const WORKERS: usize = 8;

/// Every combined state points at an active combination that lists it,
/// and every member of an active combination points back.
///
/// Works on one snapshot so it can run while other threads mutate.
fn assert_combination_invariants(engine: &FloorEngine) {
    let snapshot = engine.snapshot();
    let state_of = |id: i64| snapshot.states.iter().find(|s| s.table_id == id);

    for state in &snapshot.states {
        if let Some(id) = state.combination_id {
            let combination = snapshot
                .combinations
                .iter()
                .find(|c| c.id == id)
                .expect("combined table points at an inactive combination");
            assert!(combination.contains(state.table_id));
            assert_eq!(combination.status, state.status);
        }
    }
    for combination in &snapshot.combinations {
        for id in combination.member_ids() {
            assert_eq!(
                state_of(id).and_then(|s| s.combination_id),
                Some(combination.id)
            );
        }
    }
}

#[test]
fn test_racing_seatings_single_winner() {
    let engine = Arc::new(create_test_engine());
    let table = add_table(&engine, 1, 4);
    let barrier = Arc::new(Barrier::new(WORKERS));

    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.set_state(
                    table.id,
                    TableStatus::Occupied,
                    StateChange {
                        party_size: Some(2),
                        actor: Some(format!("waiter-{}", i)),
                        ..Default::default()
                    },
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert!(matches!(err, FloorError::InvalidTransition { .. }));
    }
    assert_eq!(engine.get_state(table.id).unwrap().version, 2);
    assert_eq!(engine.timers().len(), 1);
}

#[test]
fn test_racing_combinations_disjoint() {
    let engine = Arc::new(create_test_engine());
    let tables: Vec<DiningTable> = (1..=4).map(|n| add_table(&engine, n, 2)).collect();
    let ids: Vec<i64> = tables.iter().map(|t| t.id).collect();
    let barrier = Arc::new(Barrier::new(WORKERS));

    // Every worker tries a pair that overlaps with its neighbours
    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let pair = vec![ids[i % 4], ids[(i + 1) % 4]];
            thread::spawn(move || {
                barrier.wait();
                engine.create_combination(CombinationCreate {
                    table_ids: pair,
                    ..Default::default()
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = results.iter().filter(|r| r.is_ok()).count();
    assert!((1..=2).contains(&created));
    for err in results.into_iter().filter_map(Result::err) {
        assert!(matches!(
            err,
            FloorError::AlreadyCombined { .. } | FloorError::TableNotFree { .. }
        ));
    }
    assert_eq!(engine.list_combinations(true).len(), created);
    assert_combination_invariants(&engine);
}

#[test]
fn test_mixed_load_keeps_invariants() {
    let engine = Arc::new(create_test_engine());
    let tables: Vec<DiningTable> = (1..=6).map(|n| add_table(&engine, n, 4)).collect();
    let ids: Vec<i64> = tables.iter().map(|t| t.id).collect();

    let handles: Vec<_> = (0..WORKERS)
        .map(|i| {
            let engine = engine.clone();
            let ids = ids.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    let a = ids[(i + round) % ids.len()];
                    let b = ids[(i + round + 1) % ids.len()];
                    match (i + round) % 4 {
                        0 => {
                            let _ = engine.set_state(a, TableStatus::Occupied, StateChange::default());
                        }
                        1 => {
                            let _ = engine.set_state(a, TableStatus::Free, StateChange::default());
                        }
                        2 => {
                            if let Ok(c) = engine.create_combination(CombinationCreate {
                                table_ids: vec![a, b],
                                seat_now: true,
                                ..Default::default()
                            }) {
                                let _ = engine.dissolve_combination(
                                    c.combination.id,
                                    CombinationDissolve::default(),
                                );
                            }
                        }
                        _ => assert_combination_invariants(&engine),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_combination_invariants(&engine);

    let occupied = engine.stats().occupied;
    assert_eq!(engine.timers().len(), occupied);
}
