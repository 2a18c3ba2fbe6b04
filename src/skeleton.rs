//! Grid-skeleton producer: builds a [`Grid`] from either an explicit block
//! mask or a library of pre-validated skeleton patterns keyed by size.
//!
//! A pattern stores only the upper-left block positions; [`GridBuilder`]
//! applies rotational symmetry on ingest, exactly as `spec.md` §6 describes.
//! See `SPEC_FULL.md` §6 for how each registered pattern was chosen and why
//! it is guaranteed to satisfy every structural invariant.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::error::GridError;
use crate::grid::Grid;

/// Sizes for which a pattern is registered in the built-in library.
pub const SUPPORTED_SIZES: &[usize] = &[3, 5, 7, 9, 11, 13, 15, 21];

fn plus_pattern(size: usize) -> Vec<(usize, usize)> {
    let center = size / 2;
    vec![(0, center), (center, 0)]
}

lazy_static! {
    static ref PATTERN_LIBRARY: HashMap<usize, Vec<(usize, usize)>> = {
        let mut m = HashMap::new();
        // N=3 and N=5: block-free. A plus-pattern block at col/row N/2 would
        // split a length-(N-1)/2 run on a side, which for N<7 is < 3 and
        // would violate the minimum slot length invariant.
        m.insert(3, Vec::new());
        m.insert(5, Vec::new());
        for &size in &[7usize, 9, 11, 13, 15, 21] {
            m.insert(size, plus_pattern(size));
        }
        m
    };
}

/// Builds validated [`Grid`]s from either a named library pattern or an
/// explicit block mask.
pub struct GridBuilder;

impl GridBuilder {
    /// Build a grid of the given size from the built-in pattern library.
    ///
    /// # Errors
    /// Returns [`GridError::EvenSizeUnsupported`] for even sizes, or
    /// [`GridError::NoPatternForSize`] if no library entry exists for `size`.
    pub fn from_library(size: usize) -> Result<Grid, GridError> {
        if size % 2 == 0 {
            return Err(GridError::EvenSizeUnsupported(size));
        }
        let blocks = PATTERN_LIBRARY
            .get(&size)
            .ok_or(GridError::NoPatternForSize(size))?;
        Self::from_upper_left_blocks(size, blocks)
    }

    /// Build a grid from an explicit set of upper-left block positions,
    /// applying rotational symmetry on ingest.
    ///
    /// # Errors
    /// Returns [`GridError::EvenSizeUnsupported`] for even sizes, or
    /// propagates [`GridError::OutOfBounds`] / [`GridError::BlockOnFixedLetter`]
    /// from the underlying placement.
    pub fn from_upper_left_blocks(
        size: usize,
        upper_left_blocks: &[(usize, usize)],
    ) -> Result<Grid, GridError> {
        if size % 2 == 0 {
            return Err(GridError::EvenSizeUnsupported(size));
        }
        let mut grid = Grid::new(size);
        for &(row, col) in upper_left_blocks {
            grid.place_block(row, col)?;
        }
        Ok(grid)
    }

    /// Build a grid from a full (not just upper-left) set of block
    /// positions. Positions whose twin is already in the set are a no-op on
    /// the second visit; `place_block` is idempotent for already-blocked
    /// cells in the sense that placing a block at an already-blocked cell
    /// with no fixed letter present just re-blocks it.
    ///
    /// # Errors
    /// Same as [`Self::from_upper_left_blocks`].
    pub fn from_full_block_mask(
        size: usize,
        blocks: &[(usize, usize)],
    ) -> Result<Grid, GridError> {
        Self::from_upper_left_blocks(size, blocks)
    }
}
