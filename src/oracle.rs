//! The Word Oracle: a single external callable the engine consults when a
//! domain empties. Modeled as a capability interface — one method, no
//! internal state required, pure from the engine's point of view.

use std::collections::HashSet;

/// Implemented by hosts that can answer pattern-matching word requests.
///
/// `pattern` uses `.` for wildcards; other positions are uppercase letters.
/// `count` is an advisory upper bound — implementations may return fewer.
/// `used` must be excluded from the response, though the engine re-filters
/// regardless since the contract doesn't require the oracle to enforce it.
/// Latency is unbounded from the engine's point of view; errors in the
/// host's implementation should be converted to an empty result rather than
/// propagated, since the engine has no way to represent an oracle-side
/// error distinct from "nothing useful available".
pub trait WordOracle {
    fn request(&self, pattern: &str, count: usize, used: &HashSet<String>) -> Vec<String>;
}

/// An oracle that never has anything to offer. Useful for solving
/// fixed-supply puzzles where recovery should fail fast, and as the default
/// when no host oracle is wired up.
pub struct NullOracle;

impl WordOracle for NullOracle {
    fn request(&self, _pattern: &str, _count: usize, _used: &HashSet<String>) -> Vec<String> {
        Vec::new()
    }
}

/// A closure-backed oracle, for hosts (and tests) that would rather pass a
/// function than implement the trait on a named type.
pub struct FnOracle<F>(pub F)
where
    F: Fn(&str, usize, &HashSet<String>) -> Vec<String>;

impl<F> WordOracle for FnOracle<F>
where
    F: Fn(&str, usize, &HashSet<String>) -> Vec<String>,
{
    fn request(&self, pattern: &str, count: usize, used: &HashSet<String>) -> Vec<String> {
        (self.0)(pattern, count, used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_oracle_always_returns_empty() {
        let oracle = NullOracle;
        assert!(oracle.request("A..", 5, &HashSet::new()).is_empty());
    }

    #[test]
    fn fn_oracle_delegates_to_closure() {
        let oracle = FnOracle(|pattern: &str, _count: usize, _used: &HashSet<String>| {
            vec![pattern.replace('.', "X")]
        });
        assert_eq!(oracle.request("A.B", 1, &HashSet::new()), vec!["AXB"]);
    }
}
