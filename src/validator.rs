//! Structural Validator: verifies symmetry, connectivity, minimum slot
//! length, full checkedness and the block-ratio bound. Exposes a single
//! predicate returning a tagged result naming the first failing invariant;
//! failure is reported upward and never silently repaired.

use crate::grid::Grid;

/// The first structural invariant a grid fails, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    NotSymmetric,
    NotConnected,
    SlotTooShort,
    NotFullyChecked,
    BlockRatioExceeded,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            ValidationFailure::NotSymmetric => "grid is not 180-degree rotationally symmetric",
            ValidationFailure::NotConnected => "letter cells are not fully connected",
            ValidationFailure::SlotTooShort => "a letter run is shorter than 3 cells",
            ValidationFailure::NotFullyChecked => {
                "a letter cell is missing an across or down slot"
            }
            ValidationFailure::BlockRatioExceeded => "block ratio exceeds the configured ceiling",
        };
        write!(f, "{msg}")
    }
}

/// Result of validating a grid: `Ok(())` if every invariant holds, naming the
/// first failing invariant otherwise.
pub type ValidationResult = Result<(), ValidationFailure>;

/// Validate a grid against every structural invariant in `spec.md` §3,
/// checked in the order listed there. Invariant checks are ordered cheapest
/// (and most fundamental) first: an ungrounded symmetry violation makes the
/// rest of the checks meaningless, so we don't bother running them.
#[must_use]
pub fn validate(grid: &Grid) -> ValidationResult {
    if !grid.is_rotationally_symmetric() {
        return Err(ValidationFailure::NotSymmetric);
    }
    if !grid.is_fully_connected() {
        return Err(ValidationFailure::NotConnected);
    }
    if grid.min_run_length() < 3 {
        return Err(ValidationFailure::SlotTooShort);
    }
    if !grid.is_fully_checked() {
        return Err(ValidationFailure::NotFullyChecked);
    }
    if grid.block_ratio() > grid.max_block_ratio {
        return Err(ValidationFailure::BlockRatioExceeded);
    }
    Ok(())
}
