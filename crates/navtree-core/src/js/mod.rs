//! Reading and writing navigation scripts.
//!
//! The viewer loads plain JavaScript files that assign array literals to
//! global variables. [`parse_script`] reads the supported subset into
//! [`JsValue`]s and the `decode_*` functions turn those into navigation
//! types. Writing goes straight from the navigation types to text.

mod decode;
mod parser;
pub(crate) mod writer;

pub use decode::{
    DecodeError, decode_entries, decode_node, decode_nodes, decode_string, decode_targets,
};
pub use parser::{JsValue, MAX_NESTING, ParseError, Script, Statement, parse_script};

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::target::Target;
    use crate::tree::{Children, NavNode};

    /// Text written for a tree parses back into the same tree.
    #[test]
    fn test_tree_round_trip() {
        let root = NavNode::new(
            "ArmNN",
            Some(Target::page("index.xhtml")),
            Children::Nodes(vec![
                NavNode::new(
                    "Contributor Guide",
                    Some(Target::anchored("index.xhtml", "S2_1_contributions")),
                    Children::Nodes(vec![NavNode::leaf(
                        "Developer Certificate of Origin (DCO)",
                        Some(Target::anchored("index.xhtml", "S2_1_dco")),
                    )]),
                ),
                NavNode::new("Files", None, Children::Nodes(Vec::new())),
                NavNode::new(
                    "hash< armnn::profiling::ProfilingGuid >",
                    Some(Target::page(
                        "structstd_1_1hash_3_01armnn_1_1profiling_1_1_profiling_guid_01_4.xhtml",
                    )),
                    Children::Deferred(
                        "structstd_1_1hash_3_01armnn_1_1profiling_1_1_profiling_guid_01_4"
                            .to_owned(),
                    ),
                ),
                NavNode::leaf("quote \" and \\ and 'single'", None),
            ]),
        );

        let mut text = String::new();
        writer::write_tree(&mut text, "NAVTREE", &root);
        let script = parse_script(&text).unwrap();
        let nodes = decode_nodes(script.get("NAVTREE").unwrap(), "NAVTREE").unwrap();

        assert_eq!(nodes, vec![root]);
    }
}
