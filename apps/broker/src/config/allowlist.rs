//! Exact-match address allow-lists.
//!
//! Used twice: for the targets the broker may contact, and for the
//! management callers allowed to reach `/vnfproxy`. Both are configured as
//! comma-separated lists; an empty list means "no restriction".

use std::collections::BTreeSet;

/// A set of addresses compared by exact string equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressAllowlist {
    entries: BTreeSet<String>,
}

impl AddressAllowlist {
    /// Parse a comma-separated list. Entries are trimmed and empties dropped.
    pub fn parse(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// `true` when no entries are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, address: &str) -> bool {
        self.entries.contains(address)
    }

    /// Unrestricted lists admit everything; otherwise exact membership.
    pub fn permits(&self, address: &str) -> bool {
        self.is_empty() || self.contains(address)
    }
}

impl<S: Into<String>> FromIterator<S> for AddressAllowlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
