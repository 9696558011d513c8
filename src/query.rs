//! Evaluation of a [QueryPath] against a parsed [JsonValue].
//!
//! Segments are applied left to right, each one consuming the [Selection] produced by the one
//! before it. Nothing is copied during evaluation: a selection borrows from the tree it was
//! evaluated against.
use std::fmt::Display;

use log::{debug, trace};

use crate::errors::{Error, ParserResult};
use crate::paths::{PathSegment, QueryPath};
use crate::pointer::element_at;
use crate::serializer::Serializer;
use crate::JsonValue;

/// Returned when a filter applied to a single node doesn't match
static NULL: JsonValue = JsonValue::Null;

/// The result of evaluating a query
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    /// A single node, reached through key, attribute, index or wildcard access
    Node(&'a JsonValue),
    /// The entries of an array which passed a filter
    Nodes(Vec<&'a JsonValue>),
}

impl<'a> Selection<'a> {
    /// The selected node, if the selection is a single node
    pub fn as_node(&self) -> Option<&'a JsonValue> {
        match self {
            Selection::Node(node) => Some(node),
            Selection::Nodes(_) => None,
        }
    }

    /// The selected nodes, if the selection is the result of a filter
    pub fn as_nodes(&self) -> Option<&[&'a JsonValue]> {
        match self {
            Selection::Node(_) => None,
            Selection::Nodes(nodes) => Some(nodes),
        }
    }

    /// Materialise the selection as an owned value. Filtered nodes become an array
    pub fn to_value(&self) -> JsonValue {
        match self {
            Selection::Node(node) => (*node).clone(),
            Selection::Nodes(nodes) => nodes.iter().map(|n| (*n).clone()).collect(),
        }
    }
}

impl<'a> Display for Selection<'a> {
    /// Selections display in compact serialised form, filtered nodes as an array
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let serializer = Serializer::compact();
        match self {
            Selection::Node(node) => f.write_str(&serializer.serialize(node)),
            Selection::Nodes(nodes) => {
                f.write_str("[")?;
                for (index, node) in nodes.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    f.write_str(&serializer.serialize(node))?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Evaluate a parsed path against a root value. Evaluation stops at the first segment which
/// can't be applied
pub fn evaluate<'a>(root: &'a JsonValue, path: &QueryPath) -> ParserResult<Selection<'a>> {
    debug!(
        "evaluating query '{}' ({} segments)",
        path.as_str(),
        path.segments().len()
    );
    path.segments()
        .iter()
        .try_fold(Selection::Node(root), |current, segment| {
            trace!("applying segment '{}'", segment);
            match current {
                Selection::Node(node) => apply_to_node(node, segment),
                Selection::Nodes(nodes) => apply_to_nodes(nodes, segment),
            }
        })
}

fn apply_to_node<'a>(node: &'a JsonValue, segment: &PathSegment) -> ParserResult<Selection<'a>> {
    match (segment, node) {
        (PathSegment::Key(key) | PathSegment::Attribute(key), JsonValue::Object(map)) => map
            .get(key.as_str())
            .map(Selection::Node)
            .ok_or_else(|| Error::KeyNotFound { key: key.clone() }),
        (PathSegment::Wildcard, JsonValue::Object(_) | JsonValue::Array(_)) => {
            Ok(Selection::Node(node))
        }
        (PathSegment::Index(index), JsonValue::Array(values)) => {
            element_at(values, *index).map(Selection::Node)
        }
        (PathSegment::Filter(predicate), JsonValue::Array(values)) => Ok(Selection::Nodes(
            values.iter().filter(|v| predicate.matches(v)).collect(),
        )),
        (PathSegment::Filter(predicate), other) => {
            if predicate.matches(other) {
                Ok(Selection::Node(other))
            } else {
                Ok(Selection::Node(&NULL))
            }
        }
        (segment, other) => Err(type_mismatch(segment, other.kind_name())),
    }
}

/// Filtered nodes behave like an array
fn apply_to_nodes<'a>(
    nodes: Vec<&'a JsonValue>,
    segment: &PathSegment,
) -> ParserResult<Selection<'a>> {
    match segment {
        PathSegment::Index(index) => element_at(&nodes, *index).map(|n| Selection::Node(*n)),
        PathSegment::Filter(predicate) => Ok(Selection::Nodes(
            nodes.into_iter().filter(|v| predicate.matches(v)).collect(),
        )),
        PathSegment::Wildcard => Ok(Selection::Nodes(nodes)),
        PathSegment::Key(_) | PathSegment::Attribute(_) => Err(type_mismatch(segment, "array")),
    }
}

fn type_mismatch(segment: &PathSegment, found: &'static str) -> Error {
    Error::TypeMismatch {
        segment: segment.to_string(),
        found,
    }
}
