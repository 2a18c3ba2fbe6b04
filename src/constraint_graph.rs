//! Constraint Graph: derived from slots, with edges recording intersection
//! positions between pairs of perpendicular slots.

use crate::grid::Slot;
use crate::types::{CrossingId, SlotId};

/// One intersection between two slots: cell `i` of `self_slot` equals cell
/// `j` of `other_slot`.
#[derive(Debug, Clone, Copy)]
pub struct Crossing {
    pub crossing_id: CrossingId,
    pub other_slot: SlotId,
    pub self_index: usize,
    pub other_index: usize,
}

/// Adjacency-list representation of the constraint graph, keyed by slot
/// identity (index into the slot list), never by object identity — slots
/// are immutable data, not objects with lifecycle.
#[derive(Debug, Default)]
pub struct ConstraintGraph {
    /// `neighbors[slot_id]` is every crossing originating from that slot.
    neighbors: Vec<Vec<Crossing>>,
    crossing_count: usize,
}

impl ConstraintGraph {
    /// Build the graph from a finalized slot list. For each ordered pair
    /// (across, down), compute the at-most-one shared coordinate and store
    /// it as a pair of directed `Crossing`s (one per side). Parallel pairs
    /// (same orientation) are skipped without testing, since their
    /// orientations forbid intersection.
    #[must_use]
    pub fn build(slots: &[Slot]) -> Self {
        let mut neighbors: Vec<Vec<Crossing>> = vec![Vec::new(); slots.len()];
        let mut crossing_count = 0usize;

        for (a_id, a) in slots.iter().enumerate() {
            for (b_id, b) in slots.iter().enumerate() {
                if a_id >= b_id || a.orientation == b.orientation {
                    continue;
                }
                if let Some((a_index, b_index)) = shared_cell(a, b) {
                    let crossing_id = CrossingId(crossing_count);
                    crossing_count += 1;
                    neighbors[a_id].push(Crossing {
                        crossing_id,
                        other_slot: SlotId(b_id),
                        self_index: a_index,
                        other_index: b_index,
                    });
                    neighbors[b_id].push(Crossing {
                        crossing_id,
                        other_slot: SlotId(a_id),
                        self_index: b_index,
                        other_index: a_index,
                    });
                }
            }
        }

        ConstraintGraph {
            neighbors,
            crossing_count,
        }
    }

    /// Neighbour triples for the given slot: `(other_slot, index_in_self,
    /// index_in_other)`.
    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> &[Crossing] {
        &self.neighbors[slot_id.index()]
    }

    #[must_use]
    pub fn crossing_count(&self) -> usize {
        self.crossing_count
    }

    #[must_use]
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.neighbors[slot_id.index()].len()
    }
}

/// Find the unique shared cell between two perpendicular slots, if any, as
/// `(index_in_a, index_in_b)`.
fn shared_cell(a: &Slot, b: &Slot) -> Option<(usize, usize)> {
    for (i, &cell_a) in a.cells.iter().enumerate() {
        for (j, &cell_b) in b.cells.iter().enumerate() {
            if cell_a == cell_b {
                return Some((i, j));
            }
        }
    }
    None
}
