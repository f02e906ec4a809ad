//! Differences between two releases of the flat index.

use std::cmp::Ordering;

use serde::Serialize;

use crate::index::{FlatIndex, IndexEntry};
use crate::target::Target;

/// A key whose single link moved to a new target.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Retarget {
    /// Display key.
    pub key: String,
    /// Target in the old release.
    pub old: Target,
    /// Target in the new release.
    pub new: Target,
}

/// Changes from one index to another.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IndexDiff {
    /// Entries only in the new index.
    pub added: Vec<IndexEntry>,
    /// Entries only in the old index.
    pub removed: Vec<IndexEntry>,
    /// Keys with exactly one target in each index, and different targets.
    pub retargeted: Vec<Retarget>,
    /// Page numbers whose contents differ, including pages present in only
    /// one of the indexes.
    pub changed_pages: Vec<usize>,
}

impl IndexDiff {
    /// Whether the indexes are identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.retargeted.is_empty()
            && self.changed_pages.is_empty()
    }
}

/// Compare two indexes with a merge walk over their key groups.
#[must_use]
pub fn diff_indexes(old: &FlatIndex, new: &FlatIndex) -> IndexDiff {
    let mut diff = IndexDiff::default();
    let mut old_groups = old.entries().chunk_by(|a, b| a.key == b.key).peekable();
    let mut new_groups = new.entries().chunk_by(|a, b| a.key == b.key).peekable();

    loop {
        let order = match (old_groups.peek(), new_groups.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(o), Some(n)) => o[0].key.cmp(&n[0].key),
        };
        match order {
            Ordering::Less => {
                if let Some(group) = old_groups.next() {
                    diff.removed.extend_from_slice(group);
                }
            }
            Ordering::Greater => {
                if let Some(group) = new_groups.next() {
                    diff.added.extend_from_slice(group);
                }
            }
            Ordering::Equal => {
                if let (Some(o), Some(n)) = (old_groups.next(), new_groups.next()) {
                    diff_group(o, n, &mut diff);
                }
            }
        }
    }

    let pages = old.page_count().max(new.page_count());
    diff.changed_pages = (0..pages).filter(|&n| old.page(n) != new.page(n)).collect();

    tracing::debug!(
        added = diff.added.len(),
        removed = diff.removed.len(),
        retargeted = diff.retargeted.len(),
        changed_pages = diff.changed_pages.len(),
        "compared indexes"
    );
    diff
}

/// Compare the entries sharing one key.
fn diff_group(old: &[IndexEntry], new: &[IndexEntry], diff: &mut IndexDiff) {
    if let ([o], [n]) = (old, new) {
        if o.target != n.target {
            diff.retargeted.push(Retarget {
                key: o.key.clone(),
                old: o.target.clone(),
                new: n.target.clone(),
            });
        }
        return;
    }

    // Both groups are sorted by target
    let (mut i, mut j) = (0, 0);
    while i < old.len() || j < new.len() {
        match (old.get(i), new.get(j)) {
            (Some(o), Some(n)) if o.target == n.target => {
                i += 1;
                j += 1;
            }
            (Some(o), Some(n)) if o.target < n.target => {
                diff.removed.push(o.clone());
                i += 1;
            }
            (Some(o), None) => {
                diff.removed.push(o.clone());
                i += 1;
            }
            (_, Some(n)) => {
                diff.added.push(n.clone());
                j += 1;
            }
            (None, None) => break,
        }
    }
}
