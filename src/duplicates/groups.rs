//! Digest grouping tables.
//!
//! # Overview
//!
//! [`GroupBuilder`] applies the promotion rule as digests arrive: the first
//! path seen for a digest is only remembered in the first-seen index; the
//! second occurrence promotes the digest into a duplicate group seeded with
//! that first path. Singletons therefore never appear in [`DigestGroups`].
//!
//! # Example
//!
//! ```
//! use linkdupe::duplicates::GroupBuilder;
//! use std::path::PathBuf;
//!
//! let mut builder = GroupBuilder::new();
//! builder.insert("aa".to_string(), PathBuf::from("/a.txt"));
//! builder.insert("bb".to_string(), PathBuf::from("/b.txt"));
//! builder.insert("aa".to_string(), PathBuf::from("/sub/c.txt"));
//!
//! let groups = builder.finish();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups.get("aa").unwrap().len(), 2);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Confirmed duplicate groups: hex digest → paths in discovery order.
///
/// Every group holds at least two paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestGroups {
    groups: BTreeMap<String, Vec<PathBuf>>,
}

impl DigestGroups {
    /// Number of duplicate groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no duplicates were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Paths sharing the given hex digest, if it is a duplicate group.
    #[must_use]
    pub fn get(&self, digest: &str) -> Option<&[PathBuf]> {
        self.groups.get(digest).map(Vec::as_slice)
    }

    /// Iterate over groups ordered by digest.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.groups
            .iter()
            .map(|(digest, paths)| (digest.as_str(), paths.as_slice()))
    }

    /// Files that could be replaced by links (all copies minus one per group).
    #[must_use]
    pub fn redundant_files(&self) -> usize {
        self.groups.values().map(|paths| paths.len() - 1).sum()
    }
}

impl FromIterator<(String, Vec<PathBuf>)> for DigestGroups {
    /// Collect groups, dropping any with fewer than two paths.
    fn from_iter<I: IntoIterator<Item = (String, Vec<PathBuf>)>>(iter: I) -> Self {
        Self {
            groups: iter
                .into_iter()
                .filter(|(_, paths)| paths.len() > 1)
                .collect(),
        }
    }
}

/// Incrementally builds [`DigestGroups`] from (digest, path) observations.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    /// Hex digest → first path observed with it
    first_seen: HashMap<String, PathBuf>,
    /// Hex digest → all paths, only once a second path appears
    groups: BTreeMap<String, Vec<PathBuf>>,
}

impl GroupBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `path` has content digest `digest`.
    ///
    /// Returns `true` if the path joined (or created) a duplicate group.
    pub fn insert(&mut self, digest: String, path: PathBuf) -> bool {
        let Some(first) = self.first_seen.get(&digest) else {
            self.first_seen.insert(digest, path);
            return false;
        };

        self.groups
            .entry(digest)
            .or_insert_with(|| vec![first.clone()])
            .push(path);
        true
    }

    /// Number of distinct digests observed.
    #[must_use]
    pub fn unique_digests(&self) -> usize {
        self.first_seen.len()
    }

    /// Finish building and hand out the duplicate groups.
    #[must_use]
    pub fn finish(self) -> DigestGroups {
        DigestGroups {
            groups: self.groups,
        }
    }
}
