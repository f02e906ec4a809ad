//! Building the navigation tree from a symbol table.
//!
//! # Architecture
//!
//! Nodes are collected in a flat arena with child lists tracked by index,
//! and a map from qualified scope path to node index provides O(1)
//! containment lookups. The owned [`NavTree`] is materialized in one pass at
//! the end, sorting siblings when requested.

use std::collections::{HashMap, HashSet};

use crate::symbol::Symbol;
use crate::target::Target;
use crate::tree::{Children, NavNode, NavTree};

/// Options for [`build_tree`].
#[derive(Clone, Debug)]
pub struct TreeOptions {
    /// Label of the root node (project name).
    pub root_label: String,
    /// Target of the root node (main page).
    pub root_target: Option<Target>,
    /// Sort siblings by label then target instead of first-seen order.
    pub sort_children: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            root_label: "Documentation".to_owned(),
            root_target: Some(Target::page("index.xhtml")),
            sort_children: true,
        }
    }
}

/// Group symbols by containment into a navigation tree.
///
/// A symbol hangs below the symbol whose qualified name equals its scope.
/// Scopes without a documented symbol get a group node with no target; a
/// symbol that arrives after its group was synthesized takes the group
/// over. Exact duplicates (same qualified name and target) are added once.
///
/// # Example
///
/// ```
/// use navtree_core::{Symbol, SymbolKind, Target, TreeOptions, build_tree};
///
/// let symbols = vec![
///     Symbol::new(&["armnn"], "IBackend", SymbolKind::Class, Target::page("classarmnn_1_1_i_backend.xhtml")),
///     Symbol::new(&[], "armnn", SymbolKind::Namespace, Target::page("namespacearmnn.xhtml")),
/// ];
/// let tree = build_tree(&symbols, &TreeOptions::default());
///
/// let armnn = &tree.root().child_nodes()[0];
/// assert_eq!(armnn.label, "armnn");
/// assert_eq!(armnn.child_nodes()[0].label, "IBackend");
/// ```
#[must_use]
pub fn build_tree(symbols: &[Symbol], options: &TreeOptions) -> NavTree {
    let mut builder = TreeBuilder::new(options.root_label.clone(), options.root_target.clone());
    let mut seen = HashSet::new();

    for symbol in symbols {
        if !seen.insert((symbol.qualified_name(), &symbol.target)) {
            tracing::debug!(symbol = %symbol.qualified_name(), "skipping duplicate symbol");
            continue;
        }
        builder.add_symbol(symbol);
    }

    let tree = builder.build(options.sort_children);
    tracing::debug!(nodes = tree.node_count(), depth = tree.depth(), "built navigation tree");
    tree
}

/// Arena of nodes under construction.
struct TreeBuilder {
    labels: Vec<String>,
    targets: Vec<Option<Target>>,
    children: Vec<Vec<usize>>,
    /// True for group nodes created for undocumented scopes.
    synthesized: Vec<bool>,
    /// Qualified scope path to the node that owns it.
    scope_index: HashMap<Vec<String>, usize>,
}

const ROOT: usize = 0;

impl TreeBuilder {
    fn new(root_label: String, root_target: Option<Target>) -> Self {
        let mut scope_index = HashMap::new();
        scope_index.insert(Vec::new(), ROOT);
        Self {
            labels: vec![root_label],
            targets: vec![root_target],
            children: vec![Vec::new()],
            synthesized: vec![false],
            scope_index,
        }
    }

    fn add_node(&mut self, label: String, target: Option<Target>, parent: usize) -> usize {
        let idx = self.labels.len();
        self.labels.push(label);
        self.targets.push(target);
        self.children.push(Vec::new());
        self.synthesized.push(false);
        self.children[parent].push(idx);
        idx
    }

    /// Node owning `scope`, creating group nodes for missing segments.
    fn ensure_scope(&mut self, scope: &[String]) -> usize {
        if let Some(&idx) = self.scope_index.get(scope) {
            return idx;
        }
        let Some((last, outer)) = scope.split_last() else {
            return ROOT;
        };
        let parent = self.ensure_scope(outer);
        let idx = self.add_node(last.clone(), None, parent);
        self.synthesized[idx] = true;
        self.scope_index.insert(scope.to_vec(), idx);
        idx
    }

    fn add_symbol(&mut self, symbol: &Symbol) {
        let mut path = symbol.scope.clone();
        path.push(symbol.name.clone());

        // A group created earlier for this scope becomes the symbol's node
        if let Some(&idx) = self.scope_index.get(&path)
            && self.synthesized[idx]
        {
            self.targets[idx] = Some(symbol.target.clone());
            self.synthesized[idx] = false;
            return;
        }

        let parent = self.ensure_scope(&symbol.scope);
        let idx = self.add_node(symbol.name.clone(), Some(symbol.target.clone()), parent);
        self.scope_index.entry(path).or_insert(idx);
    }

    fn build(mut self, sort_children: bool) -> NavTree {
        if sort_children {
            let labels = &self.labels;
            let targets = &self.targets;
            for kids in &mut self.children {
                kids.sort_by(|&a, &b| {
                    labels[a]
                        .cmp(&labels[b])
                        .then_with(|| targets[a].cmp(&targets[b]))
                });
            }
        }
        NavTree::new(self.materialize(ROOT))
    }

    fn materialize(&mut self, idx: usize) -> NavNode {
        let kids = std::mem::take(&mut self.children[idx]);
        let children = if kids.is_empty() {
            Children::Leaf
        } else {
            Children::Nodes(kids.into_iter().map(|k| self.materialize(k)).collect())
        };
        NavNode {
            label: std::mem::take(&mut self.labels[idx]),
            target: self.targets[idx].take(),
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::symbol::SymbolKind;

    fn class(scope: &[&str], name: &str, path: &str) -> Symbol {
        Symbol::new(scope, name, SymbolKind::Class, Target::page(path))
    }

    fn labels(nodes: &[NavNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn test_empty_input_gives_lone_root() {
        let tree = build_tree(&[], &TreeOptions::default());

        assert_eq!(tree.root().label, "Documentation");
        assert_eq!(tree.root().target, Some(Target::page("index.xhtml")));
        assert_eq!(tree.root().children, Children::Leaf);
    }

    #[test]
    fn test_containment_by_scope() {
        let symbols = vec![
            Symbol::new(&[], "armnn", SymbolKind::Namespace, Target::page("namespacearmnn.xhtml")),
            class(&["armnn"], "Layer", "classarmnn_1_1_layer.xhtml"),
            Symbol::new(
                &["armnn", "Layer"],
                "GetName",
                SymbolKind::Function,
                Target::anchored("classarmnn_1_1_layer.xhtml", "a1"),
            ),
        ];

        let tree = build_tree(&symbols, &TreeOptions::default());

        let armnn = &tree.root().child_nodes()[0];
        assert_eq!(armnn.target, Some(Target::page("namespacearmnn.xhtml")));
        let layer = &armnn.child_nodes()[0];
        assert_eq!(layer.label, "Layer");
        assert_eq!(labels(layer.child_nodes()), vec!["GetName"]);
        assert_eq!(layer.child_nodes()[0].children, Children::Leaf);
    }

    #[test]
    fn test_missing_scope_synthesizes_group() {
        let symbols = vec![class(
            &["armnn", "profiling"],
            "ProfilingGuid",
            "classarmnn_1_1profiling_1_1_profiling_guid.xhtml",
        )];

        let tree = build_tree(&symbols, &TreeOptions::default());

        let armnn = &tree.root().child_nodes()[0];
        assert_eq!(armnn.label, "armnn");
        assert_eq!(armnn.target, None);
        let profiling = &armnn.child_nodes()[0];
        assert_eq!(profiling.label, "profiling");
        assert_eq!(profiling.target, None);
        assert_eq!(labels(profiling.child_nodes()), vec!["ProfilingGuid"]);
    }

    #[test]
    fn test_late_container_takes_over_group() {
        let symbols = vec![
            class(&["armnn"], "Layer", "classarmnn_1_1_layer.xhtml"),
            Symbol::new(&[], "armnn", SymbolKind::Namespace, Target::page("namespacearmnn.xhtml")),
        ];

        let tree = build_tree(&symbols, &TreeOptions::default());

        assert_eq!(tree.root().child_nodes().len(), 1);
        let armnn = &tree.root().child_nodes()[0];
        assert_eq!(armnn.target, Some(Target::page("namespacearmnn.xhtml")));
        assert_eq!(labels(armnn.child_nodes()), vec!["Layer"]);
    }

    #[test]
    fn test_overloads_become_siblings() {
        let symbols = vec![
            Symbol::new(&[], "Run", SymbolKind::Function, Target::anchored("a.xhtml", "b")),
            Symbol::new(&[], "Run", SymbolKind::Function, Target::anchored("a.xhtml", "a")),
        ];

        let tree = build_tree(&symbols, &TreeOptions::default());

        let targets: Vec<_> = tree
            .root()
            .child_nodes()
            .iter()
            .map(|n| n.target.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(targets, vec!["a.xhtml#a", "a.xhtml#b"]);
    }

    #[test]
    fn test_exact_duplicates_added_once() {
        let symbols = vec![
            class(&[], "Layer", "classarmnn_1_1_layer.xhtml"),
            class(&[], "Layer", "classarmnn_1_1_layer.xhtml"),
        ];

        let tree = build_tree(&symbols, &TreeOptions::default());

        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_sorted_siblings() {
        let symbols = vec![
            class(&[], "b", "b.xhtml"),
            class(&[], "B", "B.xhtml"),
            class(&[], "a", "a.xhtml"),
        ];

        let tree = build_tree(&symbols, &TreeOptions::default());

        // Case-sensitive: uppercase sorts first
        assert_eq!(labels(tree.root().child_nodes()), vec!["B", "a", "b"]);
    }

    #[test]
    fn test_input_order_siblings() {
        let symbols = vec![
            class(&[], "b", "b.xhtml"),
            class(&[], "B", "B.xhtml"),
            class(&[], "a", "a.xhtml"),
        ];
        let options = TreeOptions {
            root_label: "ArmNN".to_owned(),
            root_target: None,
            sort_children: false,
        };

        let tree = build_tree(&symbols, &options);

        assert_eq!(tree.root().label, "ArmNN");
        assert_eq!(tree.root().target, None);
        assert_eq!(labels(tree.root().child_nodes()), vec!["b", "B", "a"]);
    }

    #[test]
    fn test_every_symbol_target_in_tree() {
        let symbols = vec![
            class(&["x", "y"], "A", "a.xhtml"),
            class(&["x"], "B", "b.xhtml"),
            class(&[], "x", "x.xhtml"),
            class(&["z"], "C", "c.xhtml"),
        ];

        let tree = build_tree(&symbols, &TreeOptions::default());

        for symbol in &symbols {
            assert!(tree.find(&symbol.target).is_some(), "{}", symbol.target);
        }
    }
}
