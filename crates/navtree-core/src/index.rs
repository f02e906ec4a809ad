//! Flat, sorted and paginated symbol index.
//!
//! The viewer never loads the whole index. The main script carries the
//! first target of every page ([`FlatIndex::boundaries`]) and each page
//! lives in its own `navtreeindex<N>.js` file, fetched on demand.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::symbol::Symbol;
use crate::target::Target;

/// One `(key, target)` entry of the flat index.
///
/// Entries order by key (byte-wise, case-sensitive), then by target path and
/// anchor.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Display key, the qualified symbol name.
    pub key: String,
    /// Documentation link.
    pub target: Target,
}

impl IndexEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(key: impl Into<String>, target: Target) -> Self {
        Self {
            key: key.into(),
            target,
        }
    }
}

impl From<&Symbol> for IndexEntry {
    fn from(symbol: &Symbol) -> Self {
        Self::new(symbol.qualified_name(), symbol.target.clone())
    }
}

/// Error returned when an index cannot be built or reassembled.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// Page size of zero.
    #[error("page size must be at least 1")]
    ZeroPageSize,
    /// A page other than the last holds fewer entries than the page size,
    /// or a page is empty.
    #[error("page {page} holds {len} entries, expected {expected}")]
    ShortPage {
        /// Page number.
        page: usize,
        /// Entries found.
        len: usize,
        /// Entries required.
        expected: usize,
    },
    /// A page holds more entries than the page size.
    #[error("page {page} holds {len} entries, at most {max} allowed")]
    OversizedPage {
        /// Page number.
        page: usize,
        /// Entries found.
        len: usize,
        /// Page size.
        max: usize,
    },
    /// Entry at `position` sorts before its predecessor.
    #[error("entry {position} is out of order")]
    Unsorted {
        /// Position in the concatenated pages.
        position: usize,
    },
    /// The same entry occurs twice.
    #[error("duplicate entry {key} -> {target}")]
    Duplicate {
        /// Display key.
        key: String,
        /// Link target.
        target: Target,
    },
}

/// Sorted, duplicate-free entries split into pages of equal size.
///
/// Two indexes are equal when they hold the same entries split into the
/// same pages, so a page size larger than the single page it produces
/// does not count.
#[derive(Clone, Debug)]
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
    page_size: usize,
}

impl PartialEq for FlatIndex {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.pages().eq(other.pages())
    }
}

impl Eq for FlatIndex {}

/// Build the flat index of `symbols` with `page_size` entries per page.
///
/// # Errors
///
/// Returns [`IndexError::ZeroPageSize`] if `page_size` is 0.
pub fn build_flat_index(symbols: &[Symbol], page_size: usize) -> Result<FlatIndex, IndexError> {
    let entries = symbols.par_iter().map(IndexEntry::from).collect();
    FlatIndex::from_entries(entries, page_size)
}

impl FlatIndex {
    /// Sort `entries`, drop exact duplicates and paginate.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::ZeroPageSize`] if `page_size` is 0.
    pub fn from_entries(mut entries: Vec<IndexEntry>, page_size: usize) -> Result<Self, IndexError> {
        if page_size == 0 {
            return Err(IndexError::ZeroPageSize);
        }

        entries.par_sort_unstable();
        let before = entries.len();
        entries.dedup();
        let dropped = before - entries.len();
        if dropped > 0 {
            tracing::warn!(dropped, "dropped duplicate index entries");
        }

        let index = Self { entries, page_size };
        tracing::debug!(
            entries = index.len(),
            pages = index.page_count(),
            page_size,
            "built flat index"
        );
        Ok(index)
    }

    /// Reassemble an index from its pages, validating it.
    ///
    /// Every page but the last must hold exactly `page_size` entries and the
    /// concatenation must be strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns the first [`IndexError`] found.
    pub fn from_pages(pages: Vec<Vec<IndexEntry>>, page_size: usize) -> Result<Self, IndexError> {
        if page_size == 0 {
            return Err(IndexError::ZeroPageSize);
        }

        let last = pages.len().saturating_sub(1);
        for (page, entries) in pages.iter().enumerate() {
            let len = entries.len();
            if len > page_size {
                return Err(IndexError::OversizedPage {
                    page,
                    len,
                    max: page_size,
                });
            }
            if len == 0 || (page < last && len < page_size) {
                return Err(IndexError::ShortPage {
                    page,
                    len,
                    expected: page_size,
                });
            }
        }

        let entries: Vec<IndexEntry> = pages.into_iter().flatten().collect();
        for (i, pair) in entries.windows(2).enumerate() {
            match pair[0].cmp(&pair[1]) {
                std::cmp::Ordering::Less => {}
                std::cmp::Ordering::Equal => {
                    return Err(IndexError::Duplicate {
                        key: pair[1].key.clone(),
                        target: pair[1].target.clone(),
                    });
                }
                std::cmp::Ordering::Greater => {
                    return Err(IndexError::Unsorted { position: i + 1 });
                }
            }
        }

        Ok(Self { entries, page_size })
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages (0 for an empty index).
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.entries.len().div_ceil(self.page_size)
    }

    /// Pages in order.
    pub fn pages(&self) -> impl ExactSizeIterator<Item = &[IndexEntry]> {
        self.entries.chunks(self.page_size)
    }

    /// Page `n`, if it exists.
    #[must_use]
    pub fn page(&self, n: usize) -> Option<&[IndexEntry]> {
        let start = n.checked_mul(self.page_size)?;
        if start >= self.entries.len() {
            return None;
        }
        let end = (start + self.page_size).min(self.entries.len());
        Some(&self.entries[start..end])
    }

    /// First target of every page.
    pub fn boundaries(&self) -> impl Iterator<Item = &Target> {
        self.pages().map(|page| &page[0].target)
    }

    /// Page holding the first entry whose key is not less than `key`.
    ///
    /// Keys sorting after every entry map to the last page. Returns `None`
    /// for an empty index.
    #[must_use]
    pub fn page_of(&self, key: &str) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let pos = self.entries.partition_point(|e| e.key.as_str() < key);
        Some(pos.min(self.entries.len() - 1) / self.page_size)
    }

    /// Entries whose key starts with `prefix`.
    ///
    /// Matching keys are contiguous in byte order, so two binary searches
    /// bound the slice.
    #[must_use]
    pub fn search_prefix(&self, prefix: &str) -> &[IndexEntry] {
        let start = self.entries.partition_point(|e| e.key.as_str() < prefix);
        let rest = &self.entries[start..];
        let len = rest.partition_point(|e| e.key.starts_with(prefix));
        &rest[..len]
    }
}
