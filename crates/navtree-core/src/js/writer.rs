//! Script rendering in the layout documentation viewers expect.
//!
//! Nodes are written one per line as `[ "label", "target", children ]`,
//! nested lists indented two spaces deeper than their parent.

use std::fmt::Write;

use crate::index::IndexEntry;
use crate::target::Target;
use crate::tree::{Children, NavNode};

/// Render `var NAVTREE = [ root ];`.
pub(crate) fn write_tree(out: &mut String, name: &str, root: &NavNode) {
    let _ = writeln!(out, "var {name} =\n[");
    write_node(out, root, 2);
    out.push_str("\n];\n");
}

/// Render a fragment script holding a node list.
///
/// Fragments use a four-space base indent.
pub(crate) fn write_fragment(out: &mut String, name: &str, nodes: &[NavNode]) {
    let _ = writeln!(out, "var {name} =\n[");
    write_node_list(out, nodes, 4);
    out.push_str("\n];\n");
}

/// Render an array of strings, one per line without indentation.
pub(crate) fn write_string_array<'a>(
    out: &mut String,
    name: &str,
    items: impl IntoIterator<Item = &'a Target>,
) {
    let _ = writeln!(out, "var {name} =\n[");
    let mut first = true;
    for item in items {
        if !first {
            out.push_str(",\n");
        }
        first = false;
        out.push_str(&quote(&item.to_string(), '"'));
    }
    out.push_str("\n];\n");
}

/// Render one index page as an array of `[ "key", "target" ]` pairs.
pub(crate) fn write_entries(out: &mut String, name: &str, entries: &[IndexEntry]) {
    let _ = writeln!(out, "var {name} =\n[");
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str(",\n");
        }
        let _ = write!(
            out,
            "  [ {}, {} ]",
            quote(&entry.key, '"'),
            quote(&entry.target.to_string(), '"')
        );
    }
    out.push_str("\n];\n");
}

/// Render `var NAME = 'value';`.
pub(crate) fn write_string_var(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(out, "var {name} = {};", quote(value, '\''));
}

fn write_node_list(out: &mut String, nodes: &[NavNode], indent: usize) {
    for (i, node) in nodes.iter().enumerate() {
        if i > 0 {
            out.push_str(",\n");
        }
        write_node(out, node, indent);
    }
}

fn write_node(out: &mut String, node: &NavNode, indent: usize) {
    let pad = " ".repeat(indent);
    let target = node
        .target
        .as_ref()
        .map_or_else(|| "null".to_owned(), |t| quote(&t.to_string(), '"'));
    let _ = write!(out, "{pad}[ {}, {target}, ", quote(&node.label, '"'));

    match &node.children {
        Children::Leaf => out.push_str("null ]"),
        Children::Deferred(name) => {
            out.push_str(&quote(name, '"'));
            out.push_str(" ]");
        }
        Children::Nodes(children) if children.is_empty() => out.push_str("[ ] ]"),
        Children::Nodes(children) => {
            out.push_str("[\n");
            write_node_list(out, children, indent + 2);
            let _ = write!(out, "\n{pad}] ]");
        }
    }
}

/// Quote a string as a JavaScript literal.
pub(crate) fn quote(value: &str, delimiter: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(delimiter);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == delimiter => {
                out.push('\\');
                out.push(c);
            }
            c if u32::from(c) < 0x20 || c == '\u{2028}' || c == '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push(delimiter);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn leaf(label: &str, target: &str) -> NavNode {
        NavNode::leaf(label, Some(Target::parse(target)))
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain", '"'), r#""plain""#);
        assert_eq!(quote(r#"a "b" \c"#, '"'), r#""a \"b\" \\c""#);
        assert_eq!(quote("it's", '\''), r"'it\'s'");
        assert_eq!(quote("it's", '"'), r#""it's""#);
        assert_eq!(quote("line\nbreak\u{1}", '"'), r#""line\nbreak\u0001""#);
    }

    #[test]
    fn test_write_tree_layout() {
        let root = NavNode::new(
            "ArmNN",
            Some(Target::page("index.xhtml")),
            Children::Nodes(vec![
                NavNode::new(
                    "Introduction",
                    Some(Target::page("index.xhtml")),
                    Children::Nodes(vec![leaf("License", "index.xhtml#S1_license")]),
                ),
                NavNode::new("Namespaces", None, Children::Deferred("namespaces".to_owned())),
            ]),
        );

        let mut out = String::new();
        write_tree(&mut out, "NAVTREE", &root);

        let expected = r#"var NAVTREE =
[
  [ "ArmNN", "index.xhtml", [
    [ "Introduction", "index.xhtml", [
      [ "License", "index.xhtml#S1_license", null ]
    ] ],
    [ "Namespaces", null, "namespaces" ]
  ] ]
];
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_fragment_layout() {
        let nodes = vec![
            leaf("LOWEST_CAPTURE_PERIOD", "_types_8hpp.xhtml#a602ddc"),
            NavNode::new("Empty", None, Children::Nodes(Vec::new())),
        ];

        let mut out = String::new();
        write_fragment(&mut out, "_types_8hpp", &nodes);

        let expected = r#"var _types_8hpp =
[
    [ "LOWEST_CAPTURE_PERIOD", "_types_8hpp.xhtml#a602ddc", null ],
    [ "Empty", null, [ ] ]
];
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_string_array_and_vars() {
        let targets = [Target::page("_abs_8hpp.xhtml"), Target::parse("a.xhtml#b")];

        let mut out = String::new();
        write_string_array(&mut out, "NAVTREEINDEX", &targets);
        write_string_var(&mut out, "SYNCONMSG", "click to disable panel synchronisation");

        let expected = r#"var NAVTREEINDEX =
[
"_abs_8hpp.xhtml",
"a.xhtml#b"
];
var SYNCONMSG = 'click to disable panel synchronisation';
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_entries() {
        let entries = vec![
            IndexEntry::new("armnn::IBackend", Target::page("classarmnn_1_1_i_backend.xhtml")),
            IndexEntry::new("armnn::Layer", Target::page("classarmnn_1_1_layer.xhtml")),
        ];

        let mut out = String::new();
        write_entries(&mut out, "NAVTREEINDEX0", &entries);

        let expected = r#"var NAVTREEINDEX0 =
[
  [ "armnn::IBackend", "classarmnn_1_1_i_backend.xhtml" ],
  [ "armnn::Layer", "classarmnn_1_1_layer.xhtml" ]
];
"#;
        assert_eq!(out, expected);
    }
}
