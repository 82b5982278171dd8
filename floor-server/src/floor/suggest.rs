//! Assignment suggestions
//!
//! Pure scoring over a floor snapshot. Nothing here reserves anything: the
//! caller re-validates through the engine when it acts on a suggestion.

use std::cmp::Ordering;

use shared::models::{DiningTable, Suggestion, SuggestionKind, SuggestionQuery, TableStatus, Zone};

use super::FloorState;
use super::combination::{adjacency_confirmed, max_pairwise_distance};
use super::error::{FloorError, FloorResult};

/// Scoring weights
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub penalty_per_extra_seat: f64,
    pub min_score: f64,
    pub zone_match_bonus: f64,
    pub zone_mismatch_penalty: f64,
    /// Charged once per table beyond the first
    pub combination_table_penalty: f64,
    pub unconfirmed_adjacency_penalty: f64,
    pub max_group_size: usize,
    /// Members closer than this count as touching; also bounds `es_optima`
    pub max_distance: Option<f64>,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            penalty_per_extra_seat: 10.0,
            min_score: 10.0,
            zone_match_bonus: 10.0,
            zone_mismatch_penalty: 15.0,
            combination_table_penalty: 5.0,
            unconfirmed_adjacency_penalty: 15.0,
            max_group_size: 3,
            max_distance: None,
        }
    }
}

/// Free, active tables outside any combination, ordered by number
pub fn eligible_tables(floor: &FloorState) -> Vec<&DiningTable> {
    let mut tables: Vec<&DiningTable> = floor
        .registry
        .iter()
        .filter(|t| t.is_active)
        .filter(|t| {
            floor
                .states
                .get(t.id)
                .is_some_and(|s| s.status == TableStatus::Free && !s.is_combined())
        })
        .collect();
    tables.sort_by_key(|t| (t.number, t.id));
    tables
}

/// Rank tables and minimal combinations for a party
pub fn suggest(
    tables: &[&DiningTable],
    query: &SuggestionQuery,
    config: &SuggestConfig,
) -> FloorResult<Vec<Suggestion>> {
    if query.party_size == 0 {
        return Err(FloorError::Validation(
            "party_size must be greater than 0".to_string(),
        ));
    }
    let party = query.party_size;

    let mut suggestions: Vec<Suggestion> = tables
        .iter()
        .filter(|t| t.capacity >= party)
        .map(|t| single(t, party, query.zone, config))
        .collect();

    let combinable: Vec<&DiningTable> = tables.iter().copied().filter(|t| t.combinable).collect();
    let mut group = Vec::with_capacity(config.max_group_size);
    collect_groups(&combinable, 0, party, config.max_group_size, &mut group, &mut |members| {
        suggestions.push(grouped(members, party, query.zone, config));
    });

    suggestions.sort_by(rank);
    if let Some(limit) = query.limit {
        suggestions.truncate(limit);
    }
    Ok(suggestions)
}

/// Walk every minimal group of 2..=max_size tables reaching `party`
///
/// A group that already seats the party is never extended, and a finished
/// group is kept only if dropping any member would leave it short.
fn collect_groups<'a>(
    tables: &[&'a DiningTable],
    start: usize,
    party: u32,
    max_size: usize,
    group: &mut Vec<&'a DiningTable>,
    emit: &mut dyn FnMut(&[&'a DiningTable]),
) {
    let seats: u32 = group.iter().map(|t| t.capacity).sum();
    if group.len() >= 2 && seats >= party {
        if group.iter().all(|t| seats - t.capacity < party) {
            emit(group);
        }
        return;
    }
    if seats >= party || group.len() == max_size {
        return;
    }
    for i in start..tables.len() {
        group.push(tables[i]);
        collect_groups(tables, i + 1, party, max_size, group, emit);
        group.pop();
    }
}

fn base_score(surplus: u32, config: &SuggestConfig) -> f64 {
    (100.0 - surplus as f64 * config.penalty_per_extra_seat).max(config.min_score)
}

fn zone_adjust(score: f64, zone: Zone, preferred: Option<Zone>, config: &SuggestConfig) -> f64 {
    match preferred {
        Some(p) if p == zone => score + config.zone_match_bonus,
        Some(_) => score - config.zone_mismatch_penalty,
        None => score,
    }
}

fn single(
    table: &DiningTable,
    party: u32,
    preferred: Option<Zone>,
    config: &SuggestConfig,
) -> Suggestion {
    let surplus = table.capacity - party;
    let score = zone_adjust(base_score(surplus, config), table.zone, preferred, config);
    Suggestion {
        kind: SuggestionKind::Table,
        table_ids: vec![table.id],
        table_numbers: vec![table.number],
        capacity: table.capacity,
        surplus,
        zone: table.zone,
        score: score.clamp(0.0, 100.0),
        distance: None,
        adjacency_confirmed: true,
    }
}

fn grouped(
    members: &[&DiningTable],
    party: u32,
    preferred: Option<Zone>,
    config: &SuggestConfig,
) -> Suggestion {
    let capacity: u32 = members.iter().map(|t| t.capacity).sum();
    let surplus = capacity - party;
    let confirmed = adjacency_confirmed(members, config.max_distance);

    let mut score = base_score(surplus, config)
        - config.combination_table_penalty * (members.len() - 1) as f64;
    if !confirmed {
        score -= config.unconfirmed_adjacency_penalty;
    }
    // A group matches the preferred zone only when every member sits in it
    let zone = members[0].zone;
    let score = match preferred {
        Some(p) if members.iter().all(|t| t.zone == p) => score + config.zone_match_bonus,
        Some(_) => score - config.zone_mismatch_penalty,
        None => score,
    };

    Suggestion {
        kind: SuggestionKind::Combination,
        table_ids: members.iter().map(|t| t.id).collect(),
        table_numbers: members.iter().map(|t| t.number).collect(),
        capacity,
        surplus,
        zone,
        score: score.clamp(0.0, 100.0),
        distance: Some(max_pairwise_distance(members)),
        adjacency_confirmed: confirmed,
    }
}

/// Score desc, then surplus, table count, lowest number, ids
fn rank(a: &Suggestion, b: &Suggestion) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.surplus.cmp(&b.surplus))
        .then(a.table_count().cmp(&b.table_count()))
        .then(a.lowest_number().cmp(&b.lowest_number()))
        .then_with(|| a.table_ids.cmp(&b.table_ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Position;

    fn table(id: i64, number: u32, capacity: u32, zone: Zone) -> DiningTable {
        DiningTable {
            id,
            number,
            name: None,
            capacity,
            zone,
            position: Position::new(number as f64 * 100.0, 0.0),
            combinable: true,
            is_active: true,
            adjacent: vec![],
            version: 1,
            updated_at: 0,
        }
    }

    fn query(party_size: u32) -> SuggestionQuery {
        SuggestionQuery {
            party_size,
            zone: None,
            limit: None,
        }
    }

    #[test]
    fn test_exact_fit_ranks_first() {
        let t4 = table(1, 1, 4, Zone::Interior);
        let t6 = table(2, 2, 6, Zone::Interior);
        let result = suggest(&[&t4, &t6], &query(4), &SuggestConfig::default()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].table_ids, vec![1]);
        assert_eq!(result[0].score, 100.0);
        assert!(result[0].score > result[1].score);
    }

    #[test]
    fn test_adjacent_pair_for_six() {
        let mut a = table(1, 1, 3, Zone::Interior);
        let b = table(2, 2, 3, Zone::Interior);
        a.adjacent = vec![2];
        let result = suggest(&[&a, &b], &query(6), &SuggestConfig::default()).unwrap();

        assert_eq!(result.len(), 1);
        let pair = &result[0];
        assert_eq!(pair.kind, SuggestionKind::Combination);
        assert_eq!(pair.capacity, 6);
        assert_eq!(pair.table_ids, vec![1, 2]);
        assert!(pair.adjacency_confirmed);
        assert_eq!(pair.score, 95.0);
    }

    #[test]
    fn test_only_minimal_groups() {
        let a = table(1, 1, 4, Zone::Interior);
        let b = table(2, 2, 4, Zone::Interior);
        let c = table(3, 3, 2, Zone::Interior);
        let result = suggest(&[&a, &b, &c], &query(7), &SuggestConfig::default()).unwrap();

        // {1,2} seats 8 and is minimal; {1,2,3} is not
        assert!(result.iter().all(|s| s.table_count() == 2));
        assert!(result.iter().any(|s| s.table_ids == vec![1, 2]));
        assert!(!result.iter().any(|s| s.table_ids == vec![1, 3]));
    }

    #[test]
    fn test_group_size_bound() {
        let tables: Vec<DiningTable> = (1..=4).map(|n| table(n, n as u32, 2, Zone::Barra)).collect();
        let refs: Vec<&DiningTable> = tables.iter().collect();
        let config = SuggestConfig {
            max_group_size: 3,
            ..Default::default()
        };
        let result = suggest(&refs, &query(8), &config).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_zone_preference_is_soft() {
        let inside = table(1, 1, 4, Zone::Interior);
        let bar = table(2, 2, 4, Zone::Barra);
        let mut q = query(4);
        q.zone = Some(Zone::Barra);
        let result = suggest(&[&inside, &bar], &q, &SuggestConfig::default()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].table_ids, vec![2]);
        assert_eq!(result[0].score, 100.0);
        assert_eq!(result[1].score, 85.0);
    }

    #[test]
    fn test_score_floor() {
        let huge = table(1, 1, 30, Zone::Interior);
        let result = suggest(&[&huge], &query(2), &SuggestConfig::default()).unwrap();
        assert_eq!(result[0].score, 10.0);
    }

    #[test]
    fn test_ties_break_by_lowest_number() {
        let a = table(7, 9, 4, Zone::Interior);
        let b = table(8, 3, 4, Zone::Interior);
        let result = suggest(&[&a, &b], &query(4), &SuggestConfig::default()).unwrap();
        assert_eq!(result[0].table_numbers, vec![3]);
    }

    #[test]
    fn test_non_combinable_excluded_from_groups() {
        let a = table(1, 1, 3, Zone::Interior);
        let mut b = table(2, 2, 3, Zone::Interior);
        b.combinable = false;
        let result = suggest(&[&a, &b], &query(6), &SuggestConfig::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_unconfirmed_adjacency_penalized() {
        let a = table(1, 1, 3, Zone::Interior);
        let b = table(2, 2, 3, Zone::Interior);
        let result = suggest(&[&a, &b], &query(6), &SuggestConfig::default()).unwrap();
        assert!(!result[0].adjacency_confirmed);
        assert_eq!(result[0].score, 80.0);
    }

    #[test]
    fn test_zero_party_rejected() {
        let err = suggest(&[], &query(0), &SuggestConfig::default()).unwrap_err();
        assert!(matches!(err, FloorError::Validation(_)));
    }

    #[test]
    fn test_limit() {
        let tables: Vec<DiningTable> =
            (1..=5).map(|n| table(n, n as u32, 4, Zone::Interior)).collect();
        let refs: Vec<&DiningTable> = tables.iter().collect();
        let mut q = query(2);
        q.limit = Some(2);
        assert_eq!(suggest(&refs, &q, &SuggestConfig::default()).unwrap().len(), 2);
    }
}
