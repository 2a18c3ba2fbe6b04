//! Backtracking search with MRV + degree variable ordering and LCV value
//! ordering (`spec.md` §4.4.3), maintaining arc consistency (MAC) after each
//! assignment.

use float_ord::FloatOrd;

use crate::constraint_graph::ConstraintGraph;
use crate::engine::ac3::{arcs_into, propagate, PropagationContext, PropagationFailure};
use crate::engine::domain::Domain;
use crate::engine::stats::Stats;
use crate::engine::{is_cancelled, EngineConfig};
use crate::grid::{Grid, Slot};
use crate::oracle::WordOracle;
use crate::types::{EntryId, Orientation, SlotId};
use crate::word_supply::{UsedEntrySet, WordSupply};

/// What one recursive step of the search concluded. `Exhausted` is the
/// ordinary "no candidate at this level worked" case, which the caller
/// interprets as a normal backtrack, not a terminal failure.
pub(crate) enum StepOutcome {
    Solved,
    Exhausted,
    BacktrackBudgetExhausted,
    Cancelled,
}

fn tie_break_key(slot: &Slot) -> (usize, usize, u8) {
    let orientation_rank = match slot.orientation {
        Orientation::Across => 0,
        Orientation::Down => 1,
    };
    (slot.start_row, slot.start_col, orientation_rank)
}

/// MRV, tie-broken by largest degree among unassigned neighbours, tie-broken
/// deterministically by slot identity.
fn select_unassigned_slot(
    slots: &[Slot],
    graph: &ConstraintGraph,
    assignment: &[Option<EntryId>],
    domains: &[Domain],
) -> Option<SlotId> {
    (0..slots.len())
        .filter(|&i| assignment[i].is_none())
        .map(SlotId)
        .min_by_key(|&sid| {
            let domain_size = domains[sid.index()].len();
            let degree = graph
                .neighbors(sid)
                .iter()
                .filter(|c| assignment[c.other_slot.index()].is_none())
                .count();
            (
                domain_size,
                std::cmp::Reverse(degree),
                tie_break_key(&slots[sid.index()]),
            )
        })
}

/// Count of unassigned-neighbour domain entries `w` would eliminate: an
/// entry `w'` is eliminated if it is unsupported by `w` at the overlap, or
/// if `w'` is literally `w` (uniqueness forbids assigning it twice).
fn lcv_count(
    w: EntryId,
    slot_id: SlotId,
    graph: &ConstraintGraph,
    assignment: &[Option<EntryId>],
    domains: &[Domain],
    supply: &WordSupply,
) -> usize {
    let mut count = 0;
    for crossing in graph.neighbors(slot_id) {
        if assignment[crossing.other_slot.index()].is_some() {
            continue;
        }
        let w_char = supply.entry(w).text.chars().nth(crossing.self_index).unwrap();
        for &wp in &domains[crossing.other_slot.index()] {
            if wp == w {
                count += 1;
                continue;
            }
            let wp_char = supply.entry(wp).text.chars().nth(crossing.other_index).unwrap();
            if wp_char != w_char {
                count += 1;
            }
        }
    }
    count
}

/// Candidates for `slot_id`'s domain, least-constraining first; ties broken
/// by quality descending, then lexicographically by text.
fn order_candidates(
    slot_id: SlotId,
    graph: &ConstraintGraph,
    assignment: &[Option<EntryId>],
    domains: &[Domain],
    supply: &WordSupply,
) -> Vec<EntryId> {
    let mut candidates = domains[slot_id.index()].clone();
    candidates.sort_by(|&a, &b| {
        let count_a = lcv_count(a, slot_id, graph, assignment, domains, supply);
        let count_b = lcv_count(b, slot_id, graph, assignment, domains, supply);
        count_a
            .cmp(&count_b)
            .then_with(|| FloatOrd(supply.entry(b).quality).cmp(&FloatOrd(supply.entry(a).quality)))
            .then_with(|| supply.entry(a).text.cmp(&supply.entry(b).text))
    });
    candidates
}

/// Does `w` respect already-assigned neighbours and the used-entry set?
fn consistent_with_assigned(
    w: EntryId,
    slot_id: SlotId,
    graph: &ConstraintGraph,
    assignment: &[Option<EntryId>],
    used: &UsedEntrySet,
    supply: &WordSupply,
) -> bool {
    if used.contains(w) {
        return false;
    }
    for crossing in graph.neighbors(slot_id) {
        if let Some(other) = assignment[crossing.other_slot.index()] {
            let w_char = supply.entry(w).text.chars().nth(crossing.self_index).unwrap();
            let other_char = supply.entry(other).text.chars().nth(crossing.other_index).unwrap();
            if w_char != other_char {
                return false;
            }
        }
    }
    true
}

/// Register one more backtrack; returns whether the budget is now exhausted.
fn record_backtrack(stats: &mut Stats, config: &EngineConfig) -> bool {
    stats.backtracks += 1;
    stats.backtracks > config.backtrack_budget
}

/// A completed assignment must never use the same entry in two slots
/// (`spec.md` §7's "assignment never contains duplicate entries"). This is a
/// bug in the search, not a property of the input, so it is only checked
/// under `check_invariants` rather than on every release build.
#[cfg(feature = "check_invariants")]
fn assert_no_duplicate_assignments(assignment: &[Option<EntryId>]) {
    let mut seen = std::collections::HashSet::new();
    for id in assignment.iter().filter_map(|slot| *slot) {
        assert!(seen.insert(id), "entry {id} assigned to two slots at once");
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn backtrack<O: WordOracle>(
    slots: &[Slot],
    graph: &ConstraintGraph,
    grid: &Grid,
    supply: &mut WordSupply,
    domains: &mut Vec<Domain>,
    assignment: &mut Vec<Option<EntryId>>,
    used: &mut UsedEntrySet,
    oracle: &O,
    config: &EngineConfig,
    stats: &mut Stats,
) -> StepOutcome {
    if is_cancelled(config) {
        return StepOutcome::Cancelled;
    }

    let Some(slot_id) = select_unassigned_slot(slots, graph, assignment, domains) else {
        #[cfg(feature = "check_invariants")]
        assert_no_duplicate_assignments(assignment);
        return StepOutcome::Solved;
    };

    let candidates = order_candidates(slot_id, graph, assignment, domains, supply);

    for w in candidates {
        if !consistent_with_assigned(w, slot_id, graph, assignment, used, supply) {
            continue;
        }

        let snapshot = domains.clone();
        domains[slot_id.index()] = vec![w];
        used.insert(w);
        assignment[slot_id.index()] = Some(w);

        let propagate_result = {
            let mut ctx = PropagationContext {
                slots,
                graph,
                grid,
                supply,
                domains: domains.as_mut_slice(),
                assignment: assignment.as_slice(),
                used,
                oracle,
                config,
                stats,
            };
            propagate(arcs_into(graph, slot_id), &mut ctx)
        };

        if let Err(failure) = propagate_result {
            *domains = snapshot;
            used.remove(w);
            assignment[slot_id.index()] = None;
            match failure {
                // A cancel observed between arcs is distinct from an
                // ordinary failed-to-maintain-consistency backtrack: it must
                // surface as `Cancelled`, not get folded into the backtrack
                // count and retried with the next candidate.
                PropagationFailure::Cancelled => return StepOutcome::Cancelled,
                PropagationFailure::DomainUnrecoverable => {
                    if record_backtrack(stats, config) {
                        return StepOutcome::BacktrackBudgetExhausted;
                    }
                    continue;
                }
            }
        }

        match backtrack(
            slots, graph, grid, supply, domains, assignment, used, oracle, config, stats,
        ) {
            StepOutcome::Solved => return StepOutcome::Solved,
            StepOutcome::BacktrackBudgetExhausted => return StepOutcome::BacktrackBudgetExhausted,
            StepOutcome::Cancelled => return StepOutcome::Cancelled,
            StepOutcome::Exhausted => {
                *domains = snapshot;
                used.remove(w);
                assignment[slot_id.index()] = None;
                if record_backtrack(stats, config) {
                    return StepOutcome::BacktrackBudgetExhausted;
                }
            }
        }
    }

    StepOutcome::Exhausted
}
