//! Domain construction and node consistency (`spec.md` §4.4.1).

use crate::grid::{Grid, Slot};
use crate::types::EntryId;
use crate::word_supply::WordSupply;

/// The finite set of entries currently considered valid for a slot. A plain
/// `Vec` rather than a hash set: domain construction preserves the
/// quality-descending order from the Word Supply so later heuristics (LCV
/// tie-breaking) can rely on it, and slot domains are small enough in
/// practice that `retain`-based removal is not a bottleneck.
pub type Domain = Vec<EntryId>;

/// Does `entry_text` satisfy every fixed letter already present at `slot`'s
/// cells in `grid`?
fn matches_fixed_letters(slot: &Slot, entry_text: &str, grid: &Grid) -> bool {
    slot.cells
        .iter()
        .zip(entry_text.chars())
        .all(|(&(row, col), ch)| match grid.cell(row, col).letter {
            Some(fixed) => fixed == ch,
            None => true,
        })
}

/// Build the initial, node-consistent domain for one slot: every entry of
/// matching length from the Word Supply, minus any that violate a fixed
/// letter already present at the slot's cells.
#[must_use]
pub fn initial_domain(slot: &Slot, grid: &Grid, supply: &WordSupply) -> Domain {
    supply
        .candidates(slot.length())
        .iter()
        .copied()
        .filter(|&id| matches_fixed_letters(slot, &supply.entry(id).text, grid))
        .collect()
}

/// Build initial domains for every slot.
#[must_use]
pub fn initial_domains(slots: &[Slot], grid: &Grid, supply: &WordSupply) -> Vec<Domain> {
    slots
        .iter()
        .map(|slot| initial_domain(slot, grid, supply))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word_supply::WordSupply;

    #[test]
    fn domain_excludes_length_mismatches_and_fixed_letter_violations() {
        let mut grid = Grid::new(5);
        grid.fix_letter(0, 0, 'A').unwrap();
        let slots = grid.enumerate_slots();
        let first_across = slots
            .iter()
            .find(|s| s.start_row == 0 && s.start_col == 0)
            .unwrap();

        let mut supply = WordSupply::new();
        supply.load_base(vec![
            ("APPLE".to_string(), 0.5),
            ("BERET".to_string(), 0.5),
            ("CAT".to_string(), 0.5),
        ]);

        let domain = initial_domain(first_across, &grid, &supply);
        let texts: Vec<&str> = domain
            .iter()
            .map(|&id| supply.entry(id).text.as_str())
            .collect();
        assert_eq!(texts, vec!["APPLE"]);
    }
}
