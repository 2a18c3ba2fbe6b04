//! Error enums for the crate's fallible boundaries.
//!
//! These sit alongside (not instead of) the plain discriminated results used
//! internally by the engine (`ValidationFailure`, `FailureReason`): per the
//! error-handling design, control flow between components never uses
//! exceptions, but genuine construction-time failures at the crate's
//! boundary are still ordinary `std::error::Error` types so callers can use
//! `?` and `From` conversions the normal way.

use thiserror::Error;

/// Errors raised while constructing or mutating a [`crate::grid::Grid`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("position ({0}, {1}) is out of bounds for a grid of size {2}")]
    OutOfBounds(usize, usize, usize),

    #[error("cannot place a block at ({0}, {1}): the cell holds a fixed letter")]
    BlockOnFixedLetter(usize, usize),

    #[error("grid size must be odd, got {0}")]
    EvenSizeUnsupported(usize),

    #[error("no skeleton pattern is registered for size {0}")]
    NoPatternForSize(usize),
}

/// Errors surfaced while validating a single candidate [`crate::word_supply::Entry`].
///
/// These never propagate to callers of `load_base` / `load_themed` (entries
/// that fail are dropped silently and counted, per spec), but give the
/// ingestion path a concrete reason to log.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EntryError {
    #[error("entry {0:?} is shorter than the minimum slot length of 3")]
    TooShort(String),

    #[error("entry {0:?} contains non-alphabetic characters after normalization")]
    NonAlphabetic(String),
}
