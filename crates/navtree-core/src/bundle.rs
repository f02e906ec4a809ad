//! The set of scripts making up a site's navigation.
//!
//! A bundle on disk consists of:
//!
//! - `navtreedata.js`: the `NAVTREE` tree, the `NAVTREEINDEX` page
//!   boundaries and the panel synchronisation messages;
//! - `navtreeindex<N>.js`: one file per index page;
//! - `<name>.js`: one file per deferred fragment.
//!
//! Writing is incremental: files whose content would not change are left
//! alone, so publishers only re-upload what a new release touched.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::builder::{TreeOptions, build_tree};
use crate::index::{FlatIndex, IndexEntry, IndexError, build_flat_index};
use crate::js::{self, DecodeError, ParseError, Script, writer};
use crate::symbol::Symbol;
use crate::target::Target;
use crate::tree::{Children, NavNode, NavTree, ResolveError};

/// File name of the main navigation script.
pub const MAIN_SCRIPT: &str = "navtreedata.js";

/// Default number of entries per index page.
pub const DEFAULT_PAGE_SIZE: usize = 250;

/// Default message shown while panel synchronisation is on.
pub const DEFAULT_SYNC_ON_MSG: &str = "click to disable panel synchronisation";

/// Default message shown while panel synchronisation is off.
pub const DEFAULT_SYNC_OFF_MSG: &str = "click to enable panel synchronisation";

const TREE_VAR: &str = "NAVTREE";
const BOUNDARIES_VAR: &str = "NAVTREEINDEX";
const SYNC_ON_VAR: &str = "SYNCONMSG";
const SYNC_OFF_VAR: &str = "SYNCOFFMSG";

/// Error returned when a bundle cannot be built, read or written.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// Filesystem error.
    #[error("{}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// Script syntax error.
    #[error("{}:{source}", file.display())]
    Parse {
        /// Offending script.
        file: PathBuf,
        /// Underlying error.
        #[source]
        source: ParseError,
    },
    /// Script value with the wrong shape.
    #[error("{}: {source}", file.display())]
    Decode {
        /// Offending script.
        file: PathBuf,
        /// Underlying error.
        #[source]
        source: DecodeError,
    },
    /// Script does not assign a required variable.
    #[error("{}: variable {name} not defined", file.display())]
    MissingVariable {
        /// Offending script.
        file: PathBuf,
        /// Expected variable.
        name: String,
    },
    /// A page does not start with the target its boundary names.
    #[error("index page {page} starts with {found}, boundary says {expected}")]
    Boundary {
        /// Page number.
        page: usize,
        /// Target listed in `NAVTREEINDEX`.
        expected: Target,
        /// First target of the page.
        found: Target,
    },
    /// Invalid index.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// An invariant a loaded bundle breaks.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A deferred reference names a fragment that is not present.
    #[error("missing fragment script {0}.js")]
    MissingFragment(String),
    /// Fragments reference each other in a loop.
    #[error("fragment reference cycle through {0}")]
    FragmentCycle(String),
    /// An index entry links somewhere the tree never does.
    #[error("index entry {key} -> {target} is not in the navigation tree")]
    UnreachableTarget {
        /// Display key.
        key: String,
        /// Link target.
        target: Target,
    },
}

/// Options for [`NavBundle::build`].
#[derive(Clone, Debug)]
pub struct BundleOptions {
    /// Tree shape options.
    pub tree: TreeOptions,
    /// Entries per index page.
    pub page_size: usize,
    /// Depth from which children move into fragment scripts (0 keeps the
    /// whole tree inline).
    pub inline_depth: usize,
    /// Message shown while panel synchronisation is on.
    pub sync_on_msg: String,
    /// Message shown while panel synchronisation is off.
    pub sync_off_msg: String,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            tree: TreeOptions::default(),
            page_size: DEFAULT_PAGE_SIZE,
            inline_depth: 0,
            sync_on_msg: DEFAULT_SYNC_ON_MSG.to_owned(),
            sync_off_msg: DEFAULT_SYNC_OFF_MSG.to_owned(),
        }
    }
}

/// Files touched by [`NavBundle::write`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files created or rewritten.
    pub written: Vec<PathBuf>,
    /// Files whose content was already up to date.
    pub unchanged: Vec<PathBuf>,
    /// Stale index pages deleted.
    pub removed: Vec<PathBuf>,
}

/// Navigation tree, flat index and fragments of one documentation release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavBundle {
    /// Tree with deferred references into `fragments`.
    pub tree: NavTree,
    /// Paginated index.
    pub index: FlatIndex,
    /// Fragment name to the children it holds.
    pub fragments: BTreeMap<String, Vec<NavNode>>,
    /// Message shown while panel synchronisation is on.
    pub sync_on_msg: String,
    /// Message shown while panel synchronisation is off.
    pub sync_off_msg: String,
}

impl NavBundle {
    /// Build the navigation of `symbols`.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Index`] if the page size is 0.
    pub fn build(symbols: &[Symbol], options: &BundleOptions) -> Result<Self, BundleError> {
        let index = build_flat_index(symbols, options.page_size)?;
        let mut tree = build_tree(symbols, &options.tree);
        let fragments = tree.split_deferred(options.inline_depth);

        tracing::info!(
            symbols = symbols.len(),
            nodes = tree.node_count(),
            entries = index.len(),
            pages = index.page_count(),
            fragments = fragments.len(),
            "built navigation"
        );

        Ok(Self {
            tree,
            index,
            fragments,
            sync_on_msg: options.sync_on_msg.clone(),
            sync_off_msg: options.sync_off_msg.clone(),
        })
    }

    /// Render every script as `(file name, content)`.
    fn render(&self) -> Vec<(String, String)> {
        let mut main = String::new();
        writer::write_tree(&mut main, TREE_VAR, self.tree.root());
        main.push('\n');
        writer::write_string_array(&mut main, BOUNDARIES_VAR, self.index.boundaries());
        main.push('\n');
        writer::write_string_var(&mut main, SYNC_ON_VAR, &self.sync_on_msg);
        writer::write_string_var(&mut main, SYNC_OFF_VAR, &self.sync_off_msg);

        let mut files = vec![(MAIN_SCRIPT.to_owned(), main)];
        for (n, page) in self.index.pages().enumerate() {
            let mut out = String::new();
            writer::write_entries(&mut out, &page_var(n), page);
            files.push((page_file(n), out));
        }
        for (name, nodes) in &self.fragments {
            let mut out = String::new();
            writer::write_fragment(&mut out, name, nodes);
            files.push((format!("{name}.js"), out));
        }
        files
    }

    /// Write all scripts into `dir`, creating it if needed.
    ///
    /// Files already holding the right content are not rewritten, and index
    /// pages beyond the new page count are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError::Io`] on the first filesystem failure.
    pub fn write(&self, dir: &Path) -> Result<WriteReport, BundleError> {
        fs::create_dir_all(dir).map_err(|source| BundleError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let outcomes: Vec<(PathBuf, bool)> = self
            .render()
            .into_par_iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                let written = write_if_changed(&path, &content)?;
                Ok((path, written))
            })
            .collect::<Result<_, BundleError>>()?;

        let mut report = WriteReport::default();
        for (path, written) in outcomes {
            if written {
                report.written.push(path);
            } else {
                report.unchanged.push(path);
            }
        }

        for path in stale_pages(dir, self.index.page_count())? {
            fs::remove_file(&path).map_err(|source| BundleError::Io {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "removed stale index page");
            report.removed.push(path);
        }

        tracing::info!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            removed = report.removed.len(),
            dir = %dir.display(),
            "wrote navigation scripts"
        );
        Ok(report)
    }

    /// Load the bundle stored in `dir`.
    ///
    /// Every index page named by the boundaries is read and validated.
    /// Fragments are loaded by following deferred references; references to
    /// absent fragment files are left for [`check`](Self::check) to report.
    ///
    /// # Errors
    ///
    /// Returns [`BundleError`] if a script is missing, malformed, or the
    /// index pages are inconsistent.
    pub fn read(dir: &Path) -> Result<Self, BundleError> {
        let main_path = dir.join(MAIN_SCRIPT);
        let main = read_script(&main_path)?;

        let roots = js::decode_nodes(require(&main, &main_path, TREE_VAR)?, TREE_VAR)
            .map_err(|source| decode_error(&main_path, source))?;
        let root = match <[NavNode; 1]>::try_from(roots) {
            Ok([root]) => root,
            Err(roots) => {
                return Err(decode_error(
                    &main_path,
                    DecodeError {
                        path: TREE_VAR.to_owned(),
                        message: format!("expected exactly one root node, found {}", roots.len()),
                    },
                ));
            }
        };
        let boundaries = js::decode_targets(
            require(&main, &main_path, BOUNDARIES_VAR)?,
            BOUNDARIES_VAR,
        )
        .map_err(|source| decode_error(&main_path, source))?;
        let sync_on_msg = optional_string(&main, &main_path, SYNC_ON_VAR, DEFAULT_SYNC_ON_MSG)?;
        let sync_off_msg = optional_string(&main, &main_path, SYNC_OFF_VAR, DEFAULT_SYNC_OFF_MSG)?;

        let pages = (0..boundaries.len())
            .into_par_iter()
            .map(|n| read_page(dir, n))
            .collect::<Result<Vec<_>, _>>()?;
        for (page, (entries, expected)) in pages.iter().zip(&boundaries).enumerate() {
            if let Some(first) = entries.first()
                && first.target != *expected
            {
                return Err(BundleError::Boundary {
                    page,
                    expected: expected.clone(),
                    found: first.target.clone(),
                });
            }
        }
        let page_size = pages.first().map_or(DEFAULT_PAGE_SIZE, |p| p.len().max(1));
        let index = FlatIndex::from_pages(pages, page_size)?;

        let tree = NavTree::new(root);
        let fragments = read_fragments(dir, &tree)?;

        tracing::debug!(
            dir = %dir.display(),
            entries = index.len(),
            fragments = fragments.len(),
            "read navigation scripts"
        );

        Ok(Self {
            tree,
            index,
            fragments,
            sync_on_msg,
            sync_off_msg,
        })
    }

    /// The tree with every available fragment inlined.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cycle`] if fragments reference each other in
    /// a loop.
    pub fn resolved_tree(&self) -> Result<NavTree, ResolveError> {
        let mut tree = self.tree.clone();
        tree.resolve_available(&self.fragments)?;
        Ok(tree)
    }

    /// Verify the bundle's cross-file invariants.
    ///
    /// Index ordering and page boundaries are validated on construction;
    /// this checks that fragments resolve without cycles and that every
    /// index entry links to a node of the resolved tree.
    #[must_use]
    pub fn check(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        let mut tree = self.tree.clone();
        match tree.resolve_available(&self.fragments) {
            Ok(missing) => {
                violations.extend(missing.into_iter().map(Violation::MissingFragment));
            }
            Err(ResolveError::Cycle(name)) => {
                violations.push(Violation::FragmentCycle(name));
                return violations;
            }
            Err(ResolveError::MissingFragment(name)) => {
                violations.push(Violation::MissingFragment(name));
            }
        }

        let targets: HashSet<&Target> = tree.walk().filter_map(|v| v.node.target.as_ref()).collect();
        violations.extend(
            self.index
                .entries()
                .iter()
                .filter(|entry| !targets.contains(&entry.target))
                .map(|entry| Violation::UnreachableTarget {
                    key: entry.key.clone(),
                    target: entry.target.clone(),
                }),
        );

        tracing::debug!(violations = violations.len(), "checked navigation");
        violations
    }
}

fn page_var(n: usize) -> String {
    format!("{BOUNDARIES_VAR}{n}")
}

fn page_file(n: usize) -> String {
    format!("navtreeindex{n}.js")
}

/// Page number of a `navtreeindex<N>.js` file name.
fn page_number(file_name: &str) -> Option<usize> {
    file_name
        .strip_prefix("navtreeindex")?
        .strip_suffix(".js")?
        .parse()
        .ok()
}

/// Write `content` unless the file already holds it. Returns whether the
/// file was written.
fn write_if_changed(path: &Path, content: &str) -> Result<bool, BundleError> {
    if let Ok(existing) = fs::read(path)
        && existing == content.as_bytes()
    {
        tracing::debug!(path = %path.display(), "unchanged");
        return Ok(false);
    }
    fs::write(path, content).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "written");
    Ok(true)
}

/// Index page files in `dir` numbered `page_count` or higher.
fn stale_pages(dir: &Path, page_count: usize) -> Result<Vec<PathBuf>, BundleError> {
    let io_error = |source| BundleError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut stale = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name();
        if let Some(n) = name.to_str().and_then(page_number)
            && n >= page_count
        {
            stale.push(entry.path());
        }
    }
    stale.sort();
    Ok(stale)
}

fn read_script(path: &Path) -> Result<Script, BundleError> {
    let source = fs::read_to_string(path).map_err(|source| BundleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    js::parse_script(&source).map_err(|source| BundleError::Parse {
        file: path.to_path_buf(),
        source,
    })
}

fn require<'a>(
    script: &'a Script,
    file: &Path,
    name: &str,
) -> Result<&'a js::JsValue, BundleError> {
    script.get(name).ok_or_else(|| BundleError::MissingVariable {
        file: file.to_path_buf(),
        name: name.to_owned(),
    })
}

fn optional_string(
    script: &Script,
    file: &Path,
    name: &str,
    default: &str,
) -> Result<String, BundleError> {
    match script.get(name) {
        Some(value) => js::decode_string(value, name).map_err(|source| decode_error(file, source)),
        None => Ok(default.to_owned()),
    }
}

fn decode_error(file: &Path, source: DecodeError) -> BundleError {
    BundleError::Decode {
        file: file.to_path_buf(),
        source,
    }
}

fn read_page(dir: &Path, n: usize) -> Result<Vec<IndexEntry>, BundleError> {
    let path = dir.join(page_file(n));
    let script = read_script(&path)?;
    let name = page_var(n);
    js::decode_entries(require(&script, &path, &name)?, &name)
        .map_err(|source| decode_error(&path, source))
}

/// Load every fragment reachable from `tree` through deferred references.
fn read_fragments(
    dir: &Path,
    tree: &NavTree,
) -> Result<BTreeMap<String, Vec<NavNode>>, BundleError> {
    let mut fragments = BTreeMap::new();
    let mut queue: VecDeque<String> = tree.deferred_names().into_iter().map(str::to_owned).collect();

    while let Some(name) = queue.pop_front() {
        if fragments.contains_key(&name) {
            continue;
        }
        if !is_fragment_name(&name) {
            tracing::warn!(name = %name, "ignoring deferred reference that is not a script name");
            continue;
        }
        let path = dir.join(format!("{name}.js"));
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "fragment script not found");
            continue;
        }

        let script = read_script(&path)?;
        let nodes = js::decode_nodes(require(&script, &path, &name)?, &name)
            .map_err(|source| decode_error(&path, source))?;
        collect_deferred(&nodes, &mut queue);
        fragments.insert(name, nodes);
    }
    Ok(fragments)
}

fn collect_deferred(nodes: &[NavNode], out: &mut VecDeque<String>) {
    for node in nodes {
        match &node.children {
            Children::Deferred(name) => out.push_back(name.clone()),
            Children::Nodes(children) => collect_deferred(children, out),
            Children::Leaf => {}
        }
    }
}

/// Fragment names double as file stems; only identifiers are accepted.
fn is_fragment_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
