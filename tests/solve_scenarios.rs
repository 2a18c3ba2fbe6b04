//! End-to-end solve scenarios exercised against the public API only (no
//! `crate::` access to internals) - the same boundary a host embedding this
//! engine would use.

use std::collections::HashSet;

use fillgrid_core::constraint_graph::ConstraintGraph;
use fillgrid_core::grid::Grid;
use fillgrid_core::oracle::{FnOracle, NullOracle};
use fillgrid_core::skeleton::GridBuilder;
use fillgrid_core::word_supply::WordSupply;
use fillgrid_core::{solve, EngineConfig, FailureReason};
use indoc::indoc;
use rstest::rstest;

fn open_five_by_five_supply() -> WordSupply {
    let mut supply = WordSupply::new();
    supply.load_base(
        ["APPLE", "ABOUT", "LASER", "ELATE", "STEEP", "PLEAT", "LEAST"]
            .iter()
            .map(|w| (w.to_string(), 0.5)),
    );
    supply
}

#[test]
fn mini_grid_is_fillable_from_a_six_word_supply() {
    // 3x3 open grid: 3 across slots, 3 down slots, each length 3, crossed
    // pairwise at every cell. With exactly one candidate entry per length
    // for each orientation-compatible set, the only admissible fill uses
    // every supplied word exactly once and every crossing letter agrees.
    let grid = Grid::new(3);
    let slots = grid.enumerate_slots();
    assert_eq!(slots.len(), 6);

    let graph = ConstraintGraph::build(&slots);
    let mut supply = WordSupply::new();
    supply.load_base(
        ["SOD", "PAY", "ARE", "SPA", "OAR", "DYE"]
            .iter()
            .map(|w| (w.to_string(), 0.5)),
    );
    let oracle = NullOracle;
    let config = EngineConfig::default();

    let outcome = solve(&grid, &slots, &graph, &mut supply, &oracle, &config).unwrap();
    assert_eq!(outcome.stats.oracle_calls, 0);

    let mut used_texts: Vec<&str> = outcome
        .assignment
        .iter()
        .map(|&id| supply.entry(id).text.as_str())
        .collect();
    used_texts.sort_unstable();
    assert_eq!(used_texts, vec!["ARE", "DYE", "OAR", "PAY", "SOD", "SPA"]);

    for (slot_idx, _) in slots.iter().enumerate() {
        for crossing in graph.neighbors(fillgrid_core::types::SlotId(slot_idx)) {
            let a = supply.entry(outcome.assignment[slot_idx]);
            let b = supply.entry(outcome.assignment[crossing.other_slot.index()]);
            assert_eq!(
                a.text.chars().nth(crossing.self_index),
                b.text.chars().nth(crossing.other_index),
                "crossing between slot {slot_idx} and {} disagrees",
                crossing.other_slot
            );
        }
    }
}

#[test]
fn empty_domain_with_no_budget_at_construction_time_reports_unsolvable() {
    // Zero budget means the very first recovery attempt, during domain
    // construction, is refused before the oracle is ever invoked. Per
    // `spec.md` §4.4.1 this is a plain `Unsolvable` - `OracleBudgetExhausted`
    // is reserved for budget exhaustion discovered while maintaining arc
    // consistency or during backtracking, not at construction time.
    let grid = Grid::new(5);
    let slots = grid.enumerate_slots();
    let graph = ConstraintGraph::build(&slots);
    let mut supply = WordSupply::new(); // no entries of any length
    let oracle = FnOracle(|_: &str, _: usize, _: &HashSet<String>| Vec::new());
    let config = EngineConfig {
        oracle_call_budget: 0,
        ..EngineConfig::default()
    };

    let failure = solve(&grid, &slots, &graph, &mut supply, &oracle, &config).unwrap_err();
    assert_eq!(failure.reason, FailureReason::Unsolvable);
    assert_eq!(failure.stats.oracle_calls, 0);
}

#[test]
fn identical_inputs_produce_byte_identical_assignments_and_counters() {
    let grid = Grid::new(5);
    let slots = grid.enumerate_slots();
    let graph = ConstraintGraph::build(&slots);
    let oracle = NullOracle;
    let config = EngineConfig::default();

    let mut supply_a = open_five_by_five_supply();
    let outcome_a = solve(&grid, &slots, &graph, &mut supply_a, &oracle, &config).unwrap();

    let mut supply_b = open_five_by_five_supply();
    let outcome_b = solve(&grid, &slots, &graph, &mut supply_b, &oracle, &config).unwrap();

    assert_eq!(outcome_a.assignment, outcome_b.assignment);
    assert_eq!(outcome_a.stats, outcome_b.stats);
}

#[test]
fn solved_grid_round_trips_through_serde_json() {
    let mut grid = GridBuilder::from_library(7).unwrap();
    grid.fix_letter(0, 0, 'X').unwrap();

    let json = serde_json::to_string(&grid).expect("grid should serialize");
    let restored: Grid = serde_json::from_str(&json).expect("grid should deserialize");

    assert_eq!(grid.render(), restored.render());
    assert_eq!(grid.block_count(), restored.block_count());
}

#[test]
fn stats_round_trip_through_serde_json_preserve_the_oracle_pattern() {
    let grid = GridBuilder::from_library(9).unwrap();
    let slots = grid.enumerate_slots();
    let four_letter_slot_count = slots.iter().filter(|s| s.length() == 4).count();
    assert!(four_letter_slot_count > 0);

    let graph = ConstraintGraph::build(&slots);
    let mut supply = WordSupply::new();
    supply.load_base(vec![("ABCDEFG".to_string(), 0.5)]); // no 4-letter words
    let oracle = FnOracle(|pattern: &str, count: usize, used: &HashSet<String>| {
        ["GLUE", "LEAF", "OBOE"]
            .iter()
            .filter(|w| w.len() == pattern.len())
            .filter(|w| !used.contains(&w.to_string()))
            .take(count)
            .map(|w| w.to_string())
            .collect()
    });
    let config = EngineConfig::default();

    let stats = match solve(&grid, &slots, &graph, &mut supply, &oracle, &config) {
        Ok(outcome) => outcome.stats,
        Err(report) => report.stats,
    };
    assert!(stats.oracle_calls >= 1);

    let json = serde_json::to_string(&stats).unwrap();
    let restored: fillgrid_core::engine::Stats = serde_json::from_str(&json).unwrap();
    assert_eq!(stats, restored);
}

#[rstest]
#[case(5)]
#[case(7)]
#[case(9)]
#[case(11)]
#[case(13)]
fn every_registered_skeleton_fully_checks_and_renders_as_a_square(#[case] size: usize) {
    let grid = GridBuilder::from_library(size).unwrap();
    let rendered = grid.render();
    assert_eq!(rendered.lines().count(), size);
    assert!(rendered.lines().all(|line| line.chars().count() == size));
}

#[test]
fn grid_render_matches_the_expected_plus_skeleton_for_n7() {
    let grid = GridBuilder::from_library(7).unwrap();
    let expected = indoc! {"
        ...#...
        .......
        .......
        #.....#
        .......
        .......
        ...#...
    "};
    assert_eq!(grid.render(), expected);
}
