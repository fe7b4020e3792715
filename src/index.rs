//! The prefix inverted index.
//!
//! Maps a word's first-4-character key to the set of message locations where
//! a word with that prefix occurs. Built once during the block pass, then
//! immutable: the caller owns the value and passes it by reference into
//! every query. There is no ambient table anywhere.
//!
//! Lookup of an unknown key returns the empty set - a normal, frequent
//! outcome, not an error.

use std::collections::{BTreeSet, HashMap};

use crate::types::Location;

/// Prefix key -> locations of messages containing a word with that prefix.
///
/// `BTreeSet` keeps each posting set deduplicated and ordered by
/// (block, offset), which makes candidate iteration deterministic.
#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    terms: HashMap<String, BTreeSet<Location>>,
    empty: BTreeSet<Location>,
}

impl PrefixIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the message at `loc` contains a word keyed by `key`.
    ///
    /// Duplicate words with the same prefix in one message insert the same
    /// location into the same set - a no-op after the first.
    pub(crate) fn add(&mut self, key: String, loc: Location) {
        debug_assert!(!key.is_empty(), "empty keys are filtered at build time");
        self.terms.entry(key).or_default().insert(loc);
    }

    /// Merge another index fragment into this one (parallel build reduce).
    #[cfg(feature = "parallel")]
    pub(crate) fn merge(&mut self, other: PrefixIndex) {
        for (key, locs) in other.terms {
            self.terms.entry(key).or_default().extend(locs);
        }
    }

    /// All locations whose message contains a word with this prefix.
    pub fn lookup(&self, key: &str) -> &BTreeSet<Location> {
        self.terms.get(key).unwrap_or(&self.empty)
    }

    /// Number of distinct prefix keys.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate (key, posting set) pairs. Order is unspecified.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<Location>)> {
        self.terms.iter().map(|(k, v)| (k.as_str(), v))
    }
}
