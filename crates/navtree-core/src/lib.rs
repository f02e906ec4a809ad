//! Navigation index building for static documentation sites.
//!
//! This crate provides:
//! - [`build_tree`]: Hierarchical sidebar tree from a symbol table
//! - [`build_flat_index`]: Sorted, paginated index for lazy loading and search
//! - [`NavBundle`]: Reading, writing and checking the generated scripts
//! - [`diff_indexes`]: Changes between two releases of the index
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use navtree_core::{BundleOptions, NavBundle, SymbolTable};
//!
//! let symbols = SymbolTable::load(Path::new("symbols.json"))?;
//! let bundle = NavBundle::build(symbols.symbols(), &BundleOptions::default())?;
//!
//! // Only files whose content changed are rewritten
//! let report = bundle.write(Path::new("html"))?;
//! println!("{} files written", report.written.len());
//!
//! // Prefix search over the paginated index
//! for entry in bundle.index.search_prefix("armnn::I") {
//!     println!("{} -> {}", entry.key, entry.target);
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod bundle;
mod diff;
mod index;
pub mod js;
mod symbol;
mod target;
mod tree;

pub use builder::{TreeOptions, build_tree};
pub use bundle::{
    BundleError, BundleOptions, DEFAULT_PAGE_SIZE, DEFAULT_SYNC_OFF_MSG, DEFAULT_SYNC_ON_MSG,
    MAIN_SCRIPT, NavBundle, Violation, WriteReport,
};
pub use diff::{IndexDiff, Retarget, diff_indexes};
pub use index::{FlatIndex, IndexEntry, IndexError, build_flat_index};
pub use symbol::{SCOPE_SEPARATOR, Symbol, SymbolError, SymbolKind, SymbolTable};
pub use target::Target;
pub use tree::{Children, NavNode, NavTree, ResolveError, Visit};
