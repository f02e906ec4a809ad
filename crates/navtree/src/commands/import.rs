//! `navtree import` command implementation.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use navtree_core::js::{decode_nodes, parse_script};
use navtree_core::{Children, NavNode, NavTree, SymbolTable};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the import command.
#[derive(Args)]
pub(crate) struct ImportArgs {
    /// Fragment scripts such as hierarchy.js or _types_8hpp.js.
    #[arg(required = true)]
    fragments: Vec<PathBuf>,

    /// Symbol table JSON file to write.
    #[arg(short, long, default_value = "symbols.json")]
    output: PathBuf,
}

impl ImportArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let mut fragments = BTreeMap::new();
        for path in &self.fragments {
            for (name, nodes) in read_fragment_script(path)? {
                tracing::debug!(name = %name, path = %path.display(), nodes = nodes.len(), "read fragment");
                fragments.insert(name, nodes);
            }
        }

        let (table, missing) = import_symbols(&fragments)?;
        for name in &missing {
            output.warning(&format!("Fragment {name} not supplied, its entries are skipped"));
        }

        table.save(&self.output)?;
        output.success(&format!(
            "Imported {} symbols from {} fragments to {}",
            table.len(),
            fragments.len(),
            self.output.display()
        ));
        Ok(())
    }
}

/// Parse every `var name = [ ...nodes ];` statement of a script.
fn read_fragment_script(path: &Path) -> Result<Vec<(String, Vec<NavNode>)>, CliError> {
    let source = fs::read_to_string(path)?;
    let script = parse_script(&source)
        .map_err(|e| CliError::Script(format!("{}:{e}", path.display())))?;

    script
        .statements
        .into_iter()
        .map(|statement| {
            let nodes = decode_nodes(&statement.value, &statement.name)
                .map_err(|e| CliError::Script(format!("{}: {e}", path.display())))?;
            Ok((statement.name, nodes))
        })
        .collect()
}

/// Derive symbols from the fragments no other fragment refers to, inlining
/// the ones they refer to. Returns the table and the names of referenced
/// fragments that were not supplied.
///
/// Fragments that no root reaches can only hang off a reference cycle, so
/// they are resolved on their own to report it.
fn import_symbols(
    fragments: &BTreeMap<String, Vec<NavNode>>,
) -> Result<(SymbolTable, Vec<String>), CliError> {
    let as_tree = |name: &str, nodes: &[NavNode]| {
        NavTree::new(NavNode::new(name, None, Children::Nodes(nodes.to_vec())))
    };

    let references: BTreeMap<&str, Vec<String>> = fragments
        .iter()
        .map(|(name, nodes)| {
            let names = as_tree(name, nodes)
                .deferred_names()
                .into_iter()
                .map(str::to_owned)
                .collect();
            (name.as_str(), names)
        })
        .collect();
    let referenced: HashSet<&str> = references
        .values()
        .flatten()
        .map(String::as_str)
        .collect();
    let roots: Vec<&str> = references
        .keys()
        .copied()
        .filter(|name| !referenced.contains(name))
        .collect();

    let mut table = SymbolTable::default();
    let mut missing = Vec::new();
    for &name in &roots {
        let mut tree = as_tree(name, &fragments[name]);
        missing.extend(tree.resolve_available(fragments)?);
        table.extend(SymbolTable::from_nodes(tree.root().child_nodes()));
    }

    let reached = reachable(&references, &roots);
    for &name in references.keys().filter(|name| !reached.contains(*name)) {
        let mut tree = NavTree::new(NavNode::new(name, None, Children::Deferred(name.to_owned())));
        tree.resolve_available(fragments)?;
    }

    missing.sort();
    missing.dedup();
    Ok((table, missing))
}

/// Names of the supplied fragments reachable from `roots`, roots included.
fn reachable<'a>(
    references: &BTreeMap<&'a str, Vec<String>>,
    roots: &[&'a str],
) -> HashSet<&'a str> {
    let mut reached: HashSet<&str> = roots.iter().copied().collect();
    let mut queue: Vec<&str> = roots.to_vec();
    while let Some(name) = queue.pop() {
        for next in references.get(name).into_iter().flatten() {
            if let Some((key, _)) = references.get_key_value(next.as_str())
                && reached.insert(*key)
            {
                queue.push(*key);
            }
        }
    }
    reached
}
