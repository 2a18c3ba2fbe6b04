//! AC-3 arc consistency (`spec.md` §4.4.2) and the empty-domain recovery
//! protocol (§4.4.4) that AC-3 invokes whenever a revision empties a domain.
//!
//! The two live in one file because recovery is only ever reached from
//! inside the propagation loop (or from initial domain construction, which
//! calls back into it directly) — splitting them would just move shared
//! queue-management code across a file boundary.

use std::collections::{HashSet, VecDeque};

use log::{debug, trace, warn};

use crate::constraint_graph::ConstraintGraph;
use crate::engine::domain::Domain;
use crate::engine::stats::Stats;
use crate::engine::EngineConfig;
use crate::grid::{Grid, Slot};
use crate::oracle::WordOracle;
use crate::types::{EntryId, SlotId};
use crate::word_supply::{UsedEntrySet, WordSupply};

/// Does `candidate` match `pattern` position-for-position, treating `.` in
/// the pattern as a wildcard?
fn matches_pattern(candidate: &str, pattern: &str) -> bool {
    candidate.len() == pattern.len()
        && candidate
            .chars()
            .zip(pattern.chars())
            .all(|(c, p)| p == '.' || p == c)
}

/// Build slot `x`'s current pattern from fixed grid letters and whichever
/// perpendicular neighbours already have an assignment.
pub(crate) fn build_pattern(
    x: SlotId,
    slot: &Slot,
    grid: &Grid,
    graph: &ConstraintGraph,
    assignment: &[Option<EntryId>],
    supply: &WordSupply,
) -> String {
    let mut chars: Vec<char> = vec!['.'; slot.length()];
    for (k, &(row, col)) in slot.cells.iter().enumerate() {
        if let Some(fixed) = grid.cell(row, col).letter {
            chars[k] = fixed;
        }
    }
    for crossing in graph.neighbors(x) {
        if let Some(entry_id) = assignment[crossing.other_slot.index()] {
            let text = &supply.entry(entry_id).text;
            chars[crossing.self_index] = text.chars().nth(crossing.other_index).unwrap();
        }
    }
    chars.into_iter().collect()
}

/// Mutable borrows threaded through a single AC-3 run. Grouped into a struct
/// so `propagate` and `recover_empty_domain` don't each need a dozen
/// positional parameters.
pub(crate) struct PropagationContext<'a, O: WordOracle> {
    pub slots: &'a [Slot],
    pub graph: &'a ConstraintGraph,
    pub grid: &'a Grid,
    pub supply: &'a mut WordSupply,
    pub domains: &'a mut [Domain],
    pub assignment: &'a [Option<EntryId>],
    pub used: &'a UsedEntrySet,
    pub oracle: &'a O,
    pub config: &'a EngineConfig,
    pub stats: &'a mut Stats,
}

/// Remove every entry from `Dom(x)` unsupported by `Dom(y)` at the overlap
/// indices, honouring the uniqueness rule: an entry equal to its only
/// potential supporter in `Dom(y)` does not count as supported, since the
/// global uniqueness constraint forbids assigning the same entry to two
/// slots. Returns whether anything was removed.
fn revise(
    domains: &mut [Domain],
    supply: &WordSupply,
    x: SlotId,
    y: SlotId,
    self_index: usize,
    other_index: usize,
) -> bool {
    let y_chars: Vec<(EntryId, char)> = domains[y.index()]
        .iter()
        .map(|&id| {
            let ch = supply.entry(id).text.chars().nth(other_index).unwrap();
            (id, ch)
        })
        .collect();

    let before = domains[x.index()].len();
    domains[x.index()].retain(|&w| {
        let w_char = supply.entry(w).text.chars().nth(self_index).unwrap();
        y_chars
            .iter()
            .any(|&(wp, c)| wp != w && c == w_char)
    });
    domains[x.index()].len() != before
}

fn crossing_self_other_index(
    graph: &ConstraintGraph,
    x: SlotId,
    y: SlotId,
) -> Option<(usize, usize)> {
    graph
        .neighbors(x)
        .iter()
        .find(|c| c.other_slot == y)
        .map(|c| (c.self_index, c.other_index))
}

/// Attempt to refill an emptied domain by consulting the Word Oracle, per
/// `spec.md` §4.4.4. Returns `Ok(())` if the domain ends up non-empty,
/// `Err(())` otherwise (budget exhausted, oracle absent in effect, or the
/// oracle had nothing usable).
///
/// `report_budget_exhaustion` controls whether hitting an already-spent
/// oracle budget marks `stats.oracle_budget_hit`. Domain construction
/// (`spec.md` §4.4.1) is explicit that an empty domain with no budget
/// remaining fails `unsolvable`, not `oracle_budget_exhausted` - that
/// classification is reserved for budget exhaustion discovered while
/// maintaining arc consistency (§4.4.2) or during backtracking (§4.4.3),
/// which always call this with `report_budget_exhaustion = true` via
/// [`propagate`]. The node-consistency construction loop in `engine::solve`
/// calls this directly with `false`.
pub(crate) fn recover_empty_domain<O: WordOracle>(
    x: SlotId,
    ctx: &mut PropagationContext<'_, O>,
    report_budget_exhaustion: bool,
) -> Result<(), ()> {
    if ctx.stats.oracle_calls >= ctx.config.oracle_call_budget {
        if report_budget_exhaustion {
            ctx.stats.oracle_budget_hit = true;
        }
        warn!("oracle budget exhausted while recovering slot {x}");
        return Err(());
    }

    let slot = &ctx.slots[x.index()];
    let pattern = build_pattern(x, slot, ctx.grid, ctx.graph, ctx.assignment, ctx.supply);
    ctx.stats.last_empty_slot_pattern = Some(pattern.clone());

    let used_texts: HashSet<String> = ctx
        .used
        .ids()
        .map(|id| ctx.supply.entry(id).text.clone())
        .collect();

    debug!("slot {x} domain empty, requesting oracle pattern {pattern:?}");
    let results = ctx
        .oracle
        .request(&pattern, ctx.config.oracle_query_quota, &used_texts);
    ctx.stats.oracle_calls += 1;

    let added_ids = ctx.supply.add_oracle_entries(results);
    for id in added_ids {
        let entry = ctx.supply.entry(id);
        if entry.length() == slot.length()
            && matches_pattern(&entry.text, &pattern)
            && !ctx.used.contains(id)
        {
            ctx.domains[x.index()].push(id);
        }
    }

    if ctx.domains[x.index()].is_empty() {
        trace!("oracle recovery for slot {x} yielded nothing usable");
        Err(())
    } else {
        Ok(())
    }
}

/// Why [`propagate`] stopped short of draining its queue. Kept distinct from
/// a plain `Err(())` so callers can tell a genuinely empty, unrecoverable
/// domain apart from the host asking the engine to stop - conflating the two
/// would report `unsolvable`/`oracle_budget_exhausted` for a run the host
/// actually cancelled (`spec.md` §5/§6).
pub(crate) enum PropagationFailure {
    /// The host's cancellation handle was observed between arcs.
    Cancelled,
    /// A domain emptied and the empty-domain recovery protocol could not
    /// refill it (oracle absent, budget exhausted, or nothing usable
    /// returned).
    DomainUnrecoverable,
}

/// Run AC-3 to a fixed point starting from `queue`, recovering via the
/// oracle whenever a revision (or the initial state) leaves a domain empty.
pub(crate) fn propagate<O: WordOracle>(
    mut queue: VecDeque<(SlotId, SlotId)>,
    ctx: &mut PropagationContext<'_, O>,
) -> Result<(), PropagationFailure> {
    while let Some((x, y)) = queue.pop_front() {
        if crate::engine::is_cancelled(ctx.config) {
            return Err(PropagationFailure::Cancelled);
        }

        let Some((self_index, other_index)) = crossing_self_other_index(ctx.graph, x, y) else {
            continue;
        };

        let changed = revise(ctx.domains, ctx.supply, x, y, self_index, other_index);
        if !changed {
            continue;
        }
        ctx.stats.arc_revisions += 1;

        if ctx.domains[x.index()].is_empty() {
            recover_empty_domain(x, ctx, true).map_err(|()| PropagationFailure::DomainUnrecoverable)?;
            // Recovery only grows a domain; re-check every neighbour of x
            // against the newly-grown domain, including y.
            for neighbor in ctx.graph.neighbors(x) {
                queue.push_back((neighbor.other_slot, x));
            }
            continue;
        }

        for neighbor in ctx.graph.neighbors(x) {
            if neighbor.other_slot != y {
                queue.push_back((neighbor.other_slot, x));
            }
        }
    }
    Ok(())
}

/// The queue of every directed arc in the graph, used to seed a from-scratch
/// AC-3 pass (as opposed to the MAC episodes inside backtracking, which seed
/// from just the newly-assigned slot's neighbours).
pub(crate) fn all_arcs(graph: &ConstraintGraph, slot_count: usize) -> VecDeque<(SlotId, SlotId)> {
    let mut queue = VecDeque::new();
    for i in 0..slot_count {
        let x = SlotId(i);
        for crossing in graph.neighbors(x) {
            queue.push_back((x, crossing.other_slot));
        }
    }
    queue
}

/// The queue of arcs `(Z, S)` for every neighbour `Z` of `s`, used to seed a
/// MAC episode after `s` is pinned to a single value during search.
pub(crate) fn arcs_into(graph: &ConstraintGraph, s: SlotId) -> VecDeque<(SlotId, SlotId)> {
    graph
        .neighbors(s)
        .iter()
        .map(|crossing| (crossing.other_slot, s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint_graph::ConstraintGraph;
    use crate::engine::domain::initial_domains;
    use crate::engine::EngineConfig;
    use crate::grid::Grid;
    use crate::oracle::NullOracle;
    use crate::word_supply::WordSupply;

    #[test]
    fn revise_prunes_unsupported_entries_honouring_uniqueness() {
        let mut supply = WordSupply::new();
        supply.load_base(vec![
            ("CAT".to_string(), 0.5),
            ("COG".to_string(), 0.5),
            ("DOG".to_string(), 0.5),
        ]);
        let cat = supply.id_for_text("CAT").unwrap();
        let cog = supply.id_for_text("COG").unwrap();
        let dog = supply.id_for_text("DOG").unwrap();

        // X has {CAT}; Y has only {DOG} which would support X's "CAT" at
        // index 0 only if D==C, which it doesn't - prune.
        let mut domains = vec![vec![cat], vec![dog]];
        let changed = revise(&mut domains, &supply, SlotId(0), SlotId(1), 0, 0);
        assert!(changed);
        assert!(domains[0].is_empty());

        // Now test the uniqueness rule directly: X = {COG}, Y = {COG} only.
        // COG cannot support itself (same entry can't fill two slots), so it
        // is pruned even though the letters trivially match.
        let mut domains2 = vec![vec![cog], vec![cog]];
        let changed2 = revise(&mut domains2, &supply, SlotId(0), SlotId(1), 0, 0);
        assert!(changed2);
        assert!(domains2[0].is_empty());
    }

    #[test]
    fn propagate_converges_on_an_open_grid_without_oracle_calls() {
        let grid = Grid::new(5);
        let slots = grid.enumerate_slots();
        let graph = ConstraintGraph::build(&slots);

        let mut supply = WordSupply::new();
        supply.load_base(
            ["APPLE", "ABOUT", "LASER", "ELATE", "STEEP", "PLEAT", "LEAST"]
                .iter()
                .map(|w| (w.to_string(), 0.5)),
        );

        let mut domains = initial_domains(&slots, &grid, &supply);
        let assignment = vec![None; slots.len()];
        let used = UsedEntrySet::new();
        let oracle = NullOracle;
        let config = EngineConfig::default();
        let mut stats = Stats::default();

        let queue = all_arcs(&graph, slots.len());
        let mut ctx = PropagationContext {
            slots: &slots,
            graph: &graph,
            grid: &grid,
            supply: &mut supply,
            domains: &mut domains,
            assignment: &assignment,
            used: &used,
            oracle: &oracle,
            config: &config,
            stats: &mut stats,
        };
        assert!(propagate(queue, &mut ctx).is_ok());
        assert_eq!(stats.oracle_calls, 0);
    }

    #[test]
    fn recovery_with_no_budget_remaining_reports_budget_hit_only_when_asked() {
        let grid = Grid::new(5);
        let slots = grid.enumerate_slots();
        let graph = ConstraintGraph::build(&slots);
        let mut supply = WordSupply::new();
        let mut domains = vec![Vec::new(); slots.len()];
        let assignment = vec![None; slots.len()];
        let used = UsedEntrySet::new();
        let oracle = NullOracle;
        let config = EngineConfig {
            oracle_call_budget: 0,
            ..EngineConfig::default()
        };

        // `report_budget_exhaustion = false`: domain construction's use,
        // per `spec.md` §4.4.1 - an empty domain with no budget left fails
        // `unsolvable`, so the flag must stay clear.
        let mut stats = Stats::default();
        {
            let mut ctx = PropagationContext {
                slots: &slots,
                graph: &graph,
                grid: &grid,
                supply: &mut supply,
                domains: &mut domains,
                assignment: &assignment,
                used: &used,
                oracle: &oracle,
                config: &config,
                stats: &mut stats,
            };
            assert!(recover_empty_domain(SlotId(0), &mut ctx, false).is_err());
        }
        assert!(!stats.oracle_budget_hit);

        // `report_budget_exhaustion = true`: AC-3/backtracking's use, via
        // `propagate` - the same exhausted budget must now be visible.
        let mut stats2 = Stats::default();
        {
            let mut ctx = PropagationContext {
                slots: &slots,
                graph: &graph,
                grid: &grid,
                supply: &mut supply,
                domains: &mut domains,
                assignment: &assignment,
                used: &used,
                oracle: &oracle,
                config: &config,
                stats: &mut stats2,
            };
            assert!(recover_empty_domain(SlotId(0), &mut ctx, true).is_err());
        }
        assert!(stats2.oracle_budget_hit);
    }
}
