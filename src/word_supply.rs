//! Word Supply: a length-indexed container of candidate [`Entry`] values
//! with uniqueness tracking and quality-weighted selection. Accepts dynamic
//! additions from the Word Oracle during a solve.

use std::collections::{HashMap, HashSet};

use float_ord::FloatOrd;
use log::debug;
use unicode_normalization::UnicodeNormalization;

use crate::error::EntryError;
use crate::types::EntryId;

/// Where an [`Entry`] came from. Purely informational — the engine treats
/// all origins identically except insofar as quality differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    Base,
    Themed,
    Oracle,
}

/// A candidate word: uppercase letters, length >= 3, an origin tag and a
/// quality score in `[0, 1]`. Equal entries (by text) are deduplicated
/// across the whole supply.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub text: String,
    pub origin: Origin,
    pub quality: f32,
}

impl Entry {
    #[must_use]
    pub fn length(&self) -> usize {
        self.text.chars().count()
    }
}

/// Normalize then validate a raw candidate word: Unicode NFKD-normalize (so
/// accented input degrades to plain letters), uppercase, and require
/// length >= 3 and alphabetic-only.
fn normalize_and_validate(raw: &str) -> Result<String, EntryError> {
    let normalized: String = raw
        .nfkd()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_uppercase();

    if normalized.chars().count() < 3 {
        return Err(EntryError::TooShort(raw.to_string()));
    }
    if !normalized.chars().all(|c| c.is_alphabetic()) {
        return Err(EntryError::NonAlphabetic(raw.to_string()));
    }
    Ok(normalized)
}

/// Length-indexed mapping from length to the set of [`Entry`] values of that
/// length, plus a running set of entries assigned in the current search
/// branch. Owns all entries and lends them by reference / id.
#[derive(Debug, Default)]
pub struct WordSupply {
    entries: Vec<Entry>,
    /// Entry ids by length, kept sorted quality-descending (ties broken by
    /// insertion order, which keeps iteration deterministic).
    by_length: HashMap<usize, Vec<EntryId>>,
    /// Text -> id, for whole-supply dedup.
    by_text: HashMap<String, EntryId>,
    /// Entries dropped by `load_base` / `load_themed` / oracle filtering, for
    /// diagnostics.
    pub dropped_count: usize,
}

impl WordSupply {
    #[must_use]
    pub fn new() -> Self {
        WordSupply::default()
    }

    #[must_use]
    pub fn entry(&self, id: EntryId) -> &Entry {
        &self.entries[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries of the given length, in quality-descending order. This
    /// is the order domain construction preserves so later heuristics can
    /// prefer higher-quality fills first.
    #[must_use]
    pub fn candidates(&self, length: usize) -> &[EntryId] {
        self.by_length
            .get(&length)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn insert_sorted(&mut self, length: usize, id: EntryId) {
        let quality = self.entries[id.index()].quality;
        let bucket = self.by_length.entry(length).or_default();
        let pos = bucket
            .partition_point(|&existing| self.entries[existing.index()].quality >= quality);
        bucket.insert(pos, id);
    }

    /// Add a single already-validated, already-deduplicated entry. Returns
    /// its id if inserted, or the existing id if this text was already
    /// present (in which case the new entry is discarded, keeping whichever
    /// quality score arrived first).
    fn insert(&mut self, text: String, origin: Origin, quality: f32) -> EntryId {
        if let Some(&existing) = self.by_text.get(&text) {
            return existing;
        }
        let id = EntryId(self.entries.len());
        let length = text.chars().count();
        self.by_text.insert(text.clone(), id);
        self.entries.push(Entry {
            text,
            origin,
            quality,
        });
        self.insert_sorted(length, id);
        id
    }

    /// Bulk-load base words. Entries failing length or alphabet validation
    /// are dropped silently (and counted).
    pub fn load_base(&mut self, words: impl IntoIterator<Item = (String, f32)>) {
        for (raw, quality) in words {
            match normalize_and_validate(&raw) {
                Ok(text) => {
                    self.insert(text, Origin::Base, quality);
                }
                Err(err) => {
                    debug!("dropping invalid base entry: {err}");
                    self.dropped_count += 1;
                }
            }
        }
    }

    /// Bulk-load themed words with a priority boost applied to their quality
    /// score (clamped to `[0, 1]`).
    pub fn load_themed(&mut self, words: impl IntoIterator<Item = (String, f32)>, priority_boost: f32) {
        for (raw, quality) in words {
            match normalize_and_validate(&raw) {
                Ok(text) => {
                    let boosted = (quality + priority_boost).clamp(0.0, 1.0);
                    self.insert(text, Origin::Themed, boosted);
                }
                Err(err) => {
                    debug!("dropping invalid themed entry: {err}");
                    self.dropped_count += 1;
                }
            }
        }
    }

    /// Add oracle-supplied entries (already filtered by the caller per the
    /// recovery protocol in `spec.md` §4.4.4). Returns the ids of entries
    /// that were actually newly inserted (excludes ids that already existed
    /// under the same text).
    pub fn add_oracle_entries(&mut self, words: impl IntoIterator<Item = String>) -> Vec<EntryId> {
        let mut added = Vec::new();
        for raw in words {
            match normalize_and_validate(&raw) {
                Ok(text) => {
                    let already_present = self.by_text.contains_key(&text);
                    let id = self.insert(text, Origin::Oracle, 0.5);
                    if !already_present {
                        added.push(id);
                    }
                }
                Err(err) => {
                    debug!("dropping invalid oracle entry: {err}");
                    self.dropped_count += 1;
                }
            }
        }
        added
    }

    /// All entry ids, quality-descending globally (used by tests and
    /// diagnostics, not by the engine itself, which always works per-length).
    #[must_use]
    pub fn all_by_quality(&self) -> Vec<EntryId> {
        let mut ids: Vec<EntryId> = (0..self.entries.len()).map(EntryId).collect();
        ids.sort_by_key(|&id| std::cmp::Reverse(FloatOrd(self.entries[id.index()].quality)));
        ids
    }

    /// Text-based membership check, used by the used-entry set.
    #[must_use]
    pub fn id_for_text(&self, text: &str) -> Option<EntryId> {
        self.by_text.get(text).copied()
    }
}

/// The set of entries (by text) already assigned in the current search
/// branch. Scoped to a single solve; not part of the `WordSupply` itself so
/// that the supply can be shared read-mostly across runs.
#[derive(Debug, Default, Clone)]
pub struct UsedEntrySet {
    used: HashSet<EntryId>,
}

impl UsedEntrySet {
    #[must_use]
    pub fn new() -> Self {
        UsedEntrySet::default()
    }

    pub fn insert(&mut self, id: EntryId) -> bool {
        self.used.insert(id)
    }

    pub fn remove(&mut self, id: EntryId) -> bool {
        self.used.remove(&id)
    }

    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.used.contains(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.used.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Every entry id currently marked used, for building the oracle's
    /// excluded-text set.
    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.used.iter().copied()
    }
}
