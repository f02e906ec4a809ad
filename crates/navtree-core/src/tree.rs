//! Navigation tree for sidebar rendering.
//!
//! A [`NavTree`] owns its nodes, so it is acyclic by construction. Cycles can
//! only appear through [`Children::Deferred`] references between fragment
//! scripts; [`NavTree::resolve_deferred`] detects those.

use std::collections::{BTreeMap, HashSet};

use crate::target::Target;

/// Children of a [`NavNode`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Children {
    /// No children (`null` in scripts).
    #[default]
    Leaf,
    /// Children listed inline.
    Nodes(Vec<NavNode>),
    /// Children stored in a separately loaded fragment script.
    Deferred(String),
}

/// One entry of the sidebar tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavNode {
    /// Display label.
    pub label: String,
    /// Link target. Group entries such as "Namespaces" have none.
    pub target: Option<Target>,
    /// Child entries.
    pub children: Children,
}

impl NavNode {
    /// Create a node.
    #[must_use]
    pub fn new(label: impl Into<String>, target: Option<Target>, children: Children) -> Self {
        Self {
            label: label.into(),
            target,
            children,
        }
    }

    /// Create a node without children.
    #[must_use]
    pub fn leaf(label: impl Into<String>, target: Option<Target>) -> Self {
        Self::new(label, target, Children::Leaf)
    }

    /// Inline children, empty for leaves and deferred nodes.
    #[must_use]
    pub fn child_nodes(&self) -> &[NavNode] {
        match &self.children {
            Children::Nodes(nodes) => nodes,
            Children::Leaf | Children::Deferred(_) => &[],
        }
    }
}

/// A node visited by [`NavTree::walk`].
#[derive(Debug)]
pub struct Visit<'a> {
    /// Child indices leading from the root to this node (empty for the root).
    pub path: Vec<usize>,
    /// The visited node.
    pub node: &'a NavNode,
}

/// Rooted, ordered navigation tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavTree {
    root: NavNode,
}

/// Error returned when deferred children cannot be inlined.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A node refers to a fragment that was not supplied.
    #[error("fragment not found: {0}")]
    MissingFragment(String),
    /// Fragment references loop back to a fragment being resolved.
    #[error("fragment reference cycle through {0}")]
    Cycle(String),
}

impl NavTree {
    /// Wrap a root node.
    #[must_use]
    pub fn new(root: NavNode) -> Self {
        Self { root }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &NavNode {
        &self.root
    }

    /// Consume the tree, returning its root node.
    #[must_use]
    pub fn into_root(self) -> NavNode {
        self.root
    }

    /// Pre-order traversal of inline nodes, root first.
    pub fn walk(&self) -> impl Iterator<Item = Visit<'_>> {
        let mut stack = vec![Visit {
            path: Vec::new(),
            node: &self.root,
        }];
        std::iter::from_fn(move || {
            let visit = stack.pop()?;
            for (i, child) in visit.node.child_nodes().iter().enumerate().rev() {
                let mut path = visit.path.clone();
                path.push(i);
                stack.push(Visit { path, node: child });
            }
            Some(visit)
        })
    }

    /// Number of inline nodes including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.walk().count()
    }

    /// Length of the longest root-to-node path (0 for a lone root).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.walk().map(|v| v.path.len()).max().unwrap_or(0)
    }

    /// Nodes without inline or deferred children, in tree order.
    pub fn leaves(&self) -> impl Iterator<Item = &NavNode> {
        self.walk()
            .map(|v| v.node)
            .filter(|node| matches!(node.children, Children::Leaf))
    }

    /// Node reached by following `path` from the root.
    #[must_use]
    pub fn node_at(&self, path: &[usize]) -> Option<&NavNode> {
        path.iter()
            .try_fold(&self.root, |node, &i| node.child_nodes().get(i))
    }

    /// Path of the first node (in pre-order) linking to `target`.
    #[must_use]
    pub fn find(&self, target: &Target) -> Option<Vec<usize>> {
        self.walk()
            .find(|v| v.node.target.as_ref() == Some(target))
            .map(|v| v.path)
    }

    /// Fragment names referenced by inline nodes, in tree order.
    #[must_use]
    pub fn deferred_names(&self) -> Vec<&str> {
        self.walk()
            .filter_map(|v| match &v.node.children {
                Children::Deferred(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Inline every deferred reference using `fragments`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::MissingFragment`] if a referenced fragment is
    /// absent and [`ResolveError::Cycle`] if fragments reference each other
    /// in a loop. The tree is left partially resolved on error.
    pub fn resolve_deferred(
        &mut self,
        fragments: &BTreeMap<String, Vec<NavNode>>,
    ) -> Result<(), ResolveError> {
        let missing = self.resolve_available(fragments)?;
        match missing.into_iter().next() {
            Some(name) => Err(ResolveError::MissingFragment(name)),
            None => Ok(()),
        }
    }

    /// Inline the deferred references that `fragments` can satisfy.
    ///
    /// References to absent fragments stay deferred; their names are
    /// returned sorted and without duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cycle`] if fragments reference each other in a
    /// loop.
    pub fn resolve_available(
        &mut self,
        fragments: &BTreeMap<String, Vec<NavNode>>,
    ) -> Result<Vec<String>, ResolveError> {
        let mut missing = HashSet::new();
        let mut active = Vec::new();
        resolve_node(&mut self.root, fragments, &mut active, &mut missing)?;

        let mut missing: Vec<_> = missing.into_iter().collect();
        missing.sort();
        Ok(missing)
    }

    /// Move the inline children of every node at or below `inline_depth`
    /// into fragments, replacing them with deferred references.
    ///
    /// The root sits at depth 0. An `inline_depth` of 0 leaves the tree
    /// untouched. Fragment names come from the node target's file stem (or
    /// the label for targetless nodes); clashes get `_dup`, `_dup2`, ...
    /// suffixes. Resolving the returned fragments restores the original
    /// tree.
    pub fn split_deferred(&mut self, inline_depth: usize) -> BTreeMap<String, Vec<NavNode>> {
        let mut fragments = BTreeMap::new();
        if inline_depth == 0 {
            return fragments;
        }

        let mut names = FragmentNames::new(self);
        split_node(&mut self.root, 0, inline_depth, &mut names, &mut fragments);
        tracing::debug!(count = fragments.len(), inline_depth, "split tree into fragments");
        fragments
    }
}

fn resolve_node(
    node: &mut NavNode,
    fragments: &BTreeMap<String, Vec<NavNode>>,
    active: &mut Vec<String>,
    missing: &mut HashSet<String>,
) -> Result<(), ResolveError> {
    if let Children::Deferred(name) = &node.children {
        if active.contains(name) {
            return Err(ResolveError::Cycle(name.clone()));
        }
        let Some(nodes) = fragments.get(name) else {
            missing.insert(name.clone());
            return Ok(());
        };

        let name = name.clone();
        let mut nodes = nodes.clone();
        active.push(name);
        for child in &mut nodes {
            resolve_node(child, fragments, active, missing)?;
        }
        active.pop();
        node.children = Children::Nodes(nodes);
    } else if let Children::Nodes(children) = &mut node.children {
        for child in children {
            resolve_node(child, fragments, active, missing)?;
        }
    }
    Ok(())
}

fn split_node(
    node: &mut NavNode,
    depth: usize,
    inline_depth: usize,
    names: &mut FragmentNames,
    fragments: &mut BTreeMap<String, Vec<NavNode>>,
) {
    let Children::Nodes(children) = &mut node.children else {
        return;
    };

    // Children first so nested fragments are already referenced by name
    for child in children.iter_mut() {
        split_node(child, depth + 1, inline_depth, names, fragments);
    }

    if depth >= inline_depth && !children.is_empty() {
        let moved = std::mem::take(children);
        let name = names.allocate(node);
        fragments.insert(name.clone(), moved);
        node.children = Children::Deferred(name);
    }
}

/// Words a browser refuses as a `var` name.
const JS_RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Scripts the viewer ships next to the generated ones.
const VIEWER_SCRIPTS: &[&str] = &[
    "clipboard",
    "cookie",
    "dynsections",
    "jquery",
    "menu",
    "menudata",
    "navtree",
    "resize",
    "search",
    "searchdata",
];

/// Allocates unique fragment names that are valid script identifiers.
struct FragmentNames {
    taken: HashSet<String>,
}

impl FragmentNames {
    fn new(tree: &NavTree) -> Self {
        // Names already referenced by the tree, plus the main script's own
        let mut taken: HashSet<String> = tree
            .deferred_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        taken.insert("navtreedata".to_owned());
        Self { taken }
    }

    fn allocate(&mut self, node: &NavNode) -> String {
        let base = match &node.target {
            Some(target) if !target.stem().is_empty() => identifier(target.stem()),
            _ => identifier(&node.label),
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while self.is_reserved(&candidate) {
            candidate = if n == 1 {
                format!("{base}_dup")
            } else {
                format!("{base}_dup{n}")
            };
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.taken.contains(name)
            || JS_RESERVED_WORDS.contains(&name)
            || VIEWER_SCRIPTS.contains(&name)
            || name.starts_with("navtreeindex")
            || name.starts_with("NAVTREE")
            || name.starts_with("SYNCO")
    }
}

/// Map arbitrary text onto `[A-Za-z_][A-Za-z0-9_]*`.
fn identifier(text: &str) -> String {
    let mut out: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
