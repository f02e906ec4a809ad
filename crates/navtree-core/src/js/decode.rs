//! Conversion from parsed script values to navigation types.

use crate::index::IndexEntry;
use crate::js::parser::JsValue;
use crate::target::Target;
use crate::tree::{Children, NavNode};

/// A value did not have the shape of a navigation structure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {message}")]
pub struct DecodeError {
    /// Location of the offending value, e.g. `NAVTREE[0][2][3]`.
    pub path: String,
    /// What was expected.
    pub message: String,
}

impl DecodeError {
    fn expected(path: &str, what: &str, found: &JsValue) -> Self {
        Self {
            path: path.to_owned(),
            message: format!("expected {what}, found {}", found.kind()),
        }
    }
}

/// Decode a list of `[ label, target, children ]` nodes.
///
/// # Errors
///
/// Returns [`DecodeError`] naming the first malformed node.
pub fn decode_nodes(value: &JsValue, path: &str) -> Result<Vec<NavNode>, DecodeError> {
    let JsValue::Array(items) = value else {
        return Err(DecodeError::expected(path, "array of nodes", value));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| decode_node(item, &format!("{path}[{i}]")))
        .collect()
}

/// Decode a single `[ label, target, children ]` node.
///
/// # Errors
///
/// Returns [`DecodeError`] if the node or any descendant is malformed.
pub fn decode_node(value: &JsValue, path: &str) -> Result<NavNode, DecodeError> {
    let JsValue::Array(parts) = value else {
        return Err(DecodeError::expected(path, "node array", value));
    };
    let [label, target, children] = parts.as_slice() else {
        return Err(DecodeError {
            path: path.to_owned(),
            message: format!("expected 3 node fields, found {}", parts.len()),
        });
    };

    let JsValue::String(label) = label else {
        return Err(DecodeError::expected(&format!("{path}[0]"), "string label", label));
    };
    let target = match target {
        JsValue::Null => None,
        JsValue::String(text) => Some(Target::parse(text)),
        other => {
            return Err(DecodeError::expected(
                &format!("{path}[1]"),
                "string or null target",
                other,
            ));
        }
    };
    let children_path = format!("{path}[2]");
    let children = match children {
        JsValue::Null => Children::Leaf,
        JsValue::String(name) => Children::Deferred(name.clone()),
        JsValue::Array(_) => Children::Nodes(decode_nodes(children, &children_path)?),
        other => {
            return Err(DecodeError::expected(
                &children_path,
                "null, fragment name or node array",
                other,
            ));
        }
    };

    Ok(NavNode {
        label: label.clone(),
        target,
        children,
    })
}

/// Decode an array of target strings.
///
/// # Errors
///
/// Returns [`DecodeError`] if the value is not an array of strings.
pub fn decode_targets(value: &JsValue, path: &str) -> Result<Vec<Target>, DecodeError> {
    let JsValue::Array(items) = value else {
        return Err(DecodeError::expected(path, "array of strings", value));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            JsValue::String(text) => Ok(Target::parse(text)),
            other => Err(DecodeError::expected(&format!("{path}[{i}]"), "string", other)),
        })
        .collect()
}

/// Decode one index page of `[ key, target ]` pairs.
///
/// # Errors
///
/// Returns [`DecodeError`] if any entry is not a pair of strings.
pub fn decode_entries(value: &JsValue, path: &str) -> Result<Vec<IndexEntry>, DecodeError> {
    let JsValue::Array(items) = value else {
        return Err(DecodeError::expected(path, "array of entries", value));
    };
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let entry_path = format!("{path}[{i}]");
            match item {
                JsValue::Array(pair) => match pair.as_slice() {
                    [JsValue::String(key), JsValue::String(target)] => {
                        Ok(IndexEntry::new(key.clone(), Target::parse(target)))
                    }
                    _ => Err(DecodeError {
                        path: entry_path,
                        message: "expected [ key, target ] string pair".to_owned(),
                    }),
                },
                other => Err(DecodeError::expected(&entry_path, "entry array", other)),
            }
        })
        .collect()
}

/// Decode a string value.
///
/// # Errors
///
/// Returns [`DecodeError`] if the value is not a string.
pub fn decode_string(value: &JsValue, path: &str) -> Result<String, DecodeError> {
    match value {
        JsValue::String(s) => Ok(s.clone()),
        other => Err(DecodeError::expected(path, "string", other)),
    }
}
