//! The grid model: a square array of cells, symmetry-enforcing mutation,
//! slot enumeration and cell numbering.
//!
//! This is the single source of truth for fixed letters once a puzzle is
//! under construction; the CSP engine only ever reads from it after slot
//! enumeration has run.

use std::collections::VecDeque;

use crate::error::GridError;
use crate::types::Orientation;

/// The kind of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    Block,
    Letter,
}

/// A single cell in the grid.
///
/// Invariant: a block holds no letter or number; a letter cell holds a
/// letter only once the engine (or a caller) has fixed or assigned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
    pub kind: CellKind,
    pub letter: Option<char>,
    pub number: Option<u32>,
}

impl Cell {
    fn new_empty(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            kind: CellKind::Letter,
            letter: None,
            number: None,
        }
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        self.kind == CellKind::Block
    }

    #[must_use]
    pub fn is_letter(&self) -> bool {
        self.kind == CellKind::Letter
    }
}

/// A maximal run of letter cells in one orientation; the unit a word fills.
///
/// Identity is the pair (start, orientation); slots are immutable once
/// enumeration has produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slot {
    pub start_row: usize,
    pub start_col: usize,
    pub orientation: Orientation,
    pub cells: Vec<(usize, usize)>,
    pub number: u32,
}

impl Slot {
    #[must_use]
    pub fn length(&self) -> usize {
        self.cells.len()
    }
}

/// Square N×N array of cells plus size N.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    /// Block-ratio ceiling enforced by the structural validator; carried on
    /// the grid itself since it's a property of the puzzle instance, not the
    /// engine run.
    pub max_block_ratio: f32,
}

impl Grid {
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                cells.push(Cell::new_empty(row, col));
            }
        }
        Grid {
            size,
            cells,
            max_block_ratio: 0.16,
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.size + col
    }

    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[self.index(row, col)]
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        let idx = self.index(row, col);
        &mut self.cells[idx]
    }

    /// The rotational twin of `(row, col)` under 180° symmetry.
    #[must_use]
    pub fn rotational_twin(&self, row: usize, col: usize) -> (usize, usize) {
        (self.size - 1 - row, self.size - 1 - col)
    }

    /// Place a block at `(row, col)` and its rotational twin.
    ///
    /// Fails if either cell already holds a fixed letter.
    pub fn place_block(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        if !self.in_bounds(row, col) {
            return Err(GridError::OutOfBounds(row, col, self.size));
        }
        let (twin_row, twin_col) = self.rotational_twin(row, col);

        if self.cell(row, col).letter.is_some() {
            return Err(GridError::BlockOnFixedLetter(row, col));
        }
        if self.cell(twin_row, twin_col).letter.is_some() {
            return Err(GridError::BlockOnFixedLetter(twin_row, twin_col));
        }

        self.cell_mut(row, col).kind = CellKind::Block;
        self.cell_mut(row, col).letter = None;
        self.cell_mut(row, col).number = None;
        self.cell_mut(twin_row, twin_col).kind = CellKind::Block;
        self.cell_mut(twin_row, twin_col).letter = None;
        self.cell_mut(twin_row, twin_col).number = None;

        Ok(())
    }

    /// Fix a letter at `(row, col, ch)`. No symmetry coupling on letters.
    pub fn fix_letter(&mut self, row: usize, col: usize, ch: char) -> Result<(), GridError> {
        if !self.in_bounds(row, col) {
            return Err(GridError::OutOfBounds(row, col, self.size));
        }
        if self.cell(row, col).is_block() {
            return Err(GridError::BlockOnFixedLetter(row, col));
        }
        let cell = self.cell_mut(row, col);
        cell.letter = Some(ch.to_ascii_uppercase());
        Ok(())
    }

    /// Clear a previously-fixed letter, leaving the cell an empty letter cell.
    pub fn clear_letter(&mut self, row: usize, col: usize) {
        if self.in_bounds(row, col) {
            self.cell_mut(row, col).letter = None;
        }
    }

    /// Write an assignment's letters into the grid, one `Entry` per slot.
    pub fn write_assignment(&mut self, slots: &[Slot], entries: &[&str]) {
        for (slot, entry) in slots.iter().zip(entries.iter()) {
            for (&(row, col), ch) in slot.cells.iter().zip(entry.chars()) {
                self.cell_mut(row, col).letter = Some(ch);
            }
        }
    }

    /// Count of blocked cells.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_block()).count()
    }

    /// Current block ratio (blocks / N²).
    #[must_use]
    pub fn block_ratio(&self) -> f32 {
        self.block_count() as f32 / (self.size * self.size) as f32
    }

    /// BFS from any letter cell; returns the set of reached letter cells.
    fn reachable_letter_cells(&self) -> Vec<bool> {
        let mut visited = vec![false; self.cells.len()];
        let Some(start) = self.cells.iter().position(Cell::is_letter) else {
            return visited;
        };

        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        while let Some(idx) = queue.pop_front() {
            let row = idx / self.size;
            let col = idx % self.size;
            for (nr, nc) in self.four_neighbors(row, col) {
                let n_idx = self.index(nr, nc);
                if !visited[n_idx] && self.cells[n_idx].is_letter() {
                    visited[n_idx] = true;
                    queue.push_back(n_idx);
                }
            }
        }

        visited
    }

    fn four_neighbors(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        let mut neighbors = Vec::with_capacity(4);
        if row > 0 {
            neighbors.push((row - 1, col));
        }
        if row + 1 < self.size {
            neighbors.push((row + 1, col));
        }
        if col > 0 {
            neighbors.push((row, col - 1));
        }
        if col + 1 < self.size {
            neighbors.push((row, col + 1));
        }
        neighbors
    }

    /// Succeeds iff every letter cell is reachable from every other letter
    /// cell via 4-connected moves through letter cells.
    #[must_use]
    pub fn is_fully_connected(&self) -> bool {
        let visited = self.reachable_letter_cells();
        self.cells
            .iter()
            .zip(visited.iter())
            .all(|(cell, &seen)| !cell.is_letter() || seen)
    }

    /// Succeeds iff every block at (r, c) has a block at its rotational twin.
    #[must_use]
    pub fn is_rotationally_symmetric(&self) -> bool {
        self.cells.iter().all(|cell| {
            if !cell.is_block() {
                return true;
            }
            let (tr, tc) = self.rotational_twin(cell.row, cell.col);
            self.cell(tr, tc).is_block()
        })
    }

    /// Scans rows for maximal horizontal runs of letter cells of length >= 2,
    /// emitting an across slot for each; scans columns symmetrically for
    /// down slots. Assigns entry numbers by row-major traversal: a cell gets
    /// the next number if it begins an across or down slot, sharing one
    /// number between coincident starts.
    #[must_use]
    pub fn enumerate_slots(&self) -> Vec<Slot> {
        let across_starts = self.runs(Orientation::Across);
        let down_starts = self.runs(Orientation::Down);

        let mut numbers = vec![None; self.cells.len()];
        let mut next_number = 1u32;

        for row in 0..self.size {
            for col in 0..self.size {
                let starts_across = across_starts
                    .iter()
                    .any(|cells| cells[0] == (row, col));
                let starts_down = down_starts.iter().any(|cells| cells[0] == (row, col));
                if starts_across || starts_down {
                    numbers[self.index(row, col)] = Some(next_number);
                    next_number += 1;
                }
            }
        }

        let mut slots = Vec::with_capacity(across_starts.len() + down_starts.len());
        for cells in across_starts {
            let (start_row, start_col) = cells[0];
            let number = numbers[self.index(start_row, start_col)].unwrap();
            slots.push(Slot {
                start_row,
                start_col,
                orientation: Orientation::Across,
                cells,
                number,
            });
        }
        for cells in down_starts {
            let (start_row, start_col) = cells[0];
            let number = numbers[self.index(start_row, start_col)].unwrap();
            slots.push(Slot {
                start_row,
                start_col,
                orientation: Orientation::Down,
                cells,
                number,
            });
        }

        slots
    }

    fn runs(&self, orientation: Orientation) -> Vec<Vec<(usize, usize)>> {
        let mut runs = Vec::new();
        for major in 0..self.size {
            let mut current: Vec<(usize, usize)> = Vec::new();
            for minor in 0..self.size {
                let (row, col) = match orientation {
                    Orientation::Across => (major, minor),
                    Orientation::Down => (minor, major),
                };
                if self.cell(row, col).is_letter() {
                    current.push((row, col));
                } else {
                    if current.len() >= 2 {
                        runs.push(std::mem::take(&mut current));
                    } else {
                        current.clear();
                    }
                }
            }
            if current.len() >= 2 {
                runs.push(current);
            }
        }
        runs
    }

    /// Every maximal horizontal or vertical run of letter cells has length
    /// >= 3 (and hence no run is allowed at length 2 either — a length-2 run
    /// from [`Self::runs`] is a defect `validator` reports).
    #[must_use]
    pub fn min_run_length(&self) -> usize {
        self.runs(Orientation::Across)
            .iter()
            .chain(self.runs(Orientation::Down).iter())
            .map(Vec::len)
            .min()
            .unwrap_or(0)
    }

    /// Every letter cell lies in exactly one horizontal run (>= 2) and one
    /// vertical run (>= 2): "full checkedness". A cell fails this if it sits
    /// in a run too short to have been enumerated as a slot (isolated in one
    /// direction).
    #[must_use]
    pub fn is_fully_checked(&self) -> bool {
        let across_runs = self.runs(Orientation::Across);
        let down_runs = self.runs(Orientation::Down);

        let mut across_covered = vec![false; self.cells.len()];
        for run in &across_runs {
            for &(r, c) in run {
                across_covered[self.index(r, c)] = true;
            }
        }
        let mut down_covered = vec![false; self.cells.len()];
        for run in &down_runs {
            for &(r, c) in run {
                down_covered[self.index(r, c)] = true;
            }
        }

        self.cells.iter().enumerate().all(|(idx, cell)| {
            !cell.is_letter() || (across_covered[idx] && down_covered[idx])
        })
    }

    /// Render the grid as a human-readable string, one row per line, `#` for
    /// blocks and `.` for unfilled letter cells. Mainly useful for debugging
    /// and deterministic test fixtures.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.size * (self.size + 1));
        for row in 0..self.size {
            for col in 0..self.size {
                let cell = self.cell(row, col);
                let ch = if cell.is_block() {
                    '#'
                } else {
                    cell.letter.unwrap_or('.')
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
