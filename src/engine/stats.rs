//! Counters threaded through a solve: how many backtracks, oracle calls and
//! arc revisions occurred, plus the last pattern an empty domain presented to
//! the oracle. Exposed verbatim in both success and failure outcomes, per
//! `spec.md` §6's "failure reports carry counters" and §8 property 6
//! (determinism of counter traces).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub backtracks: usize,
    pub oracle_calls: usize,
    pub arc_revisions: usize,
    pub last_empty_slot_pattern: Option<String>,
    /// Set the first time a recovery attempt is denied because the oracle
    /// budget is already spent. Distinguishes a search that failed because
    /// it genuinely has no solution from one that failed because recovery
    /// was cut off; see `engine::solve` for how this upgrades the reported
    /// failure reason.
    pub oracle_budget_hit: bool,
}
