//! Documented symbols: the builder's input.
//!
//! A symbol table is a JSON array produced by the documentation extractor:
//!
//! ```json
//! [
//!     {"name": "armnn", "kind": "namespace", "target": "namespacearmnn.xhtml"},
//!     {"name": "IBackend", "scope": ["armnn"], "kind": "class",
//!      "target": "classarmnn_1_1_i_backend.xhtml"}
//! ]
//! ```
//!
//! Symbols can also be recovered from member-index fragments of an already
//! generated site with [`SymbolTable::from_nodes`].

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::target::Target;
use crate::tree::NavNode;

/// Separator between scope segments in display keys.
pub const SCOPE_SEPARATOR: &str = "::";

/// Kind of documented entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Namespace,
    Class,
    Struct,
    Union,
    Function,
    Variable,
    Typedef,
    Enum,
    Enumerator,
    Macro,
    /// Member whose exact kind is not recorded (anchored link into a page).
    Member,
    File,
    Directory,
    Page,
    #[default]
    Other,
}

impl SymbolKind {
    /// Guess the kind from a generated link target.
    ///
    /// Anchored links point at members; otherwise the page file name tells
    /// compounds (`class…`, `struct…`, `namespace…`, `dir_…`) and source
    /// files (`…_8hpp`, `…_8cpp`) apart from plain pages.
    #[must_use]
    pub fn infer(target: &Target) -> Self {
        if target.anchor.is_some() {
            return Self::Member;
        }
        let stem = target.stem();
        if stem.starts_with("class") {
            Self::Class
        } else if stem.starts_with("struct") {
            Self::Struct
        } else if stem.starts_with("union") {
            Self::Union
        } else if stem.starts_with("namespace") {
            Self::Namespace
        } else if stem.starts_with("dir_") {
            Self::Directory
        } else if stem.contains("_8") {
            Self::File
        } else {
            Self::Page
        }
    }
}

/// A documented entity with its generated link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unqualified name, e.g. `IBackend`.
    pub name: String,
    /// Enclosing namespaces/classes, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    /// Entity kind.
    #[serde(default)]
    pub kind: SymbolKind,
    /// Documentation link.
    pub target: Target,
}

impl Symbol {
    /// Create a symbol.
    #[must_use]
    pub fn new(
        scope: &[&str],
        name: impl Into<String>,
        kind: SymbolKind,
        target: Target,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.iter().map(|&s| s.to_owned()).collect(),
            kind,
            target,
        }
    }

    /// Display key: scope segments and name joined by `::`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        if self.scope.is_empty() {
            return self.name.clone();
        }
        let mut key = self.scope.join(SCOPE_SEPARATOR);
        key.push_str(SCOPE_SEPARATOR);
        key.push_str(&self.name);
        key
    }
}

/// Error returned when a symbol table cannot be read or written.
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    /// File could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// File is not a valid symbol table.
    #[error("{}: invalid symbol table: {source}", path.display())]
    Json {
        /// Offending file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

/// Ordered collection of symbols.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a table from symbols.
    #[must_use]
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Load a JSON symbol table.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError`] if the file is unreadable or malformed.
    pub fn load(path: &Path) -> Result<Self, SymbolError> {
        let content = fs::read_to_string(path).map_err(|source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: Self = serde_json::from_str(&content).map_err(|source| SymbolError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), count = table.len(), "loaded symbol table");
        Ok(table)
    }

    /// Write the table as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), SymbolError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| SymbolError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json + "\n").map_err(|source| SymbolError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Recover symbols from the nodes of a member-index fragment.
    ///
    /// Every node with a target becomes a symbol scoped by the labels of its
    /// targeted ancestors; targetless group nodes contribute no scope.
    /// Deferred children are skipped, so callers should inline the
    /// fragments they have first.
    #[must_use]
    pub fn from_nodes(nodes: &[NavNode]) -> Self {
        fn collect(nodes: &[NavNode], scope: &mut Vec<String>, out: &mut Vec<Symbol>) {
            for node in nodes {
                let Some(target) = &node.target else {
                    collect(node.child_nodes(), scope, out);
                    continue;
                };
                out.push(Symbol {
                    name: node.label.clone(),
                    scope: scope.clone(),
                    kind: SymbolKind::infer(target),
                    target: target.clone(),
                });
                scope.push(node.label.clone());
                collect(node.child_nodes(), scope, out);
                scope.pop();
            }
        }

        let mut symbols = Vec::new();
        collect(nodes, &mut Vec::new(), &mut symbols);
        Self { symbols }
    }

    /// Append symbols of another table.
    pub fn extend(&mut self, other: Self) {
        self.symbols.extend(other.symbols);
    }

    /// Symbols in input order.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::js::{decode_nodes, parse_script};
    use crate::tree::Children;

    #[test]
    fn test_qualified_name() {
        let top = Symbol::new(&[], "armnn", SymbolKind::Namespace, Target::page("n.xhtml"));
        let nested = Symbol::new(
            &["armnn", "profiling"],
            "ProfilingGuid",
            SymbolKind::Class,
            Target::page("c.xhtml"),
        );
        assert_eq!(top.qualified_name(), "armnn");
        assert_eq!(nested.qualified_name(), "armnn::profiling::ProfilingGuid");
    }

    #[test]
    fn test_infer_kind() {
        let cases = [
            ("classarmnn_1_1_layer.xhtml", SymbolKind::Class),
            ("structarmnn_1_1_activation_descriptor.xhtml", SymbolKind::Struct),
            ("namespacearmnn.xhtml", SymbolKind::Namespace),
            ("dir_d2f3b8e2e64df3181ebe92efcc0a3012.html", SymbolKind::Directory),
            ("_types_8hpp.xhtml", SymbolKind::File),
            ("_types_8hpp.xhtml#a602ddc", SymbolKind::Member),
            ("index.xhtml", SymbolKind::Page),
        ];
        for (target, expected) in cases {
            assert_eq!(SymbolKind::infer(&Target::parse(target)), expected, "{target}");
        }
    }

    #[test]
    fn test_json_format() {
        let json = r#"[
            {"name": "armnn", "kind": "namespace", "target": "namespacearmnn.xhtml"},
            {"name": "IBackend", "scope": ["armnn"], "kind": "class",
             "target": "classarmnn_1_1_i_backend.xhtml"},
            {"name": "MaxNumOfTensorDimensions", "scope": ["armnn"],
             "target": "_types_8hpp.xhtml#abdcd184"}
        ]"#;

        let table: SymbolTable = serde_json::from_str(json).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.symbols()[1].qualified_name(), "armnn::IBackend");
        assert_eq!(table.symbols()[2].kind, SymbolKind::Other);
        assert_eq!(
            table.symbols()[2].target,
            Target::anchored("_types_8hpp.xhtml", "abdcd184")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symbols.json");
        let table = SymbolTable::new(vec![Symbol::new(
            &["armnn"],
            "Layer",
            SymbolKind::Class,
            Target::page("classarmnn_1_1_layer.xhtml"),
        )]);

        table.save(&path).unwrap();
        let loaded = SymbolTable::load(&path).unwrap();

        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = SymbolTable::load(&path).unwrap_err();
        assert!(matches!(err, SymbolError::Json { .. }));
        assert!(err.to_string().contains("broken.json"));

        let err = SymbolTable::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SymbolError::Io { .. }));
    }

    #[test]
    fn test_from_fragment_nodes() {
        let src = r#"
var _types_8hpp =
[
    [ "IBackend", "classarmnn_1_1_i_backend.xhtml", "classarmnn_1_1_i_backend" ],
    [ "LayerType", "_types_8hpp.xhtml#a1cfaa710", [
      [ "LogicalNot", "_types_8hpp.xhtml#a1cfaa710a2a25eb", null ]
    ] ],
    [ "Group", null, [
      [ "LOWEST_CAPTURE_PERIOD", "_types_8hpp.xhtml#a602ddc", null ]
    ] ]
];
"#;
        let script = parse_script(src).unwrap();
        let nodes = decode_nodes(script.get("_types_8hpp").unwrap(), "_types_8hpp").unwrap();
        assert!(matches!(nodes[0].children, Children::Deferred(_)));

        let table = SymbolTable::from_nodes(&nodes);

        let keys: Vec<_> = table.symbols().iter().map(Symbol::qualified_name).collect();
        assert_eq!(
            keys,
            vec![
                "IBackend",
                "LayerType",
                "LayerType::LogicalNot",
                "LOWEST_CAPTURE_PERIOD",
            ]
        );
        assert_eq!(table.symbols()[0].kind, SymbolKind::Class);
        assert_eq!(table.symbols()[2].kind, SymbolKind::Member);
    }
}
