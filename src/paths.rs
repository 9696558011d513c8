//! Parsing of XPath-like query paths such as `/data/users[@name='Alice']/email`.
//!
//! A path is a list of segments separated by `/`. Separators inside brackets don't split, so
//! predicate literals may contain slashes. Each segment is one of
//!
//! - `name` for an object member, or `*` for the current container as a whole
//! - `@name` for an explicit attribute of the current object
//! - `name[N]` or `[N]` for an array element
//! - `name[predicate]` or `[predicate]` to filter (see [crate::predicate])
//!
//! Bracket groups may be chained, as in `matrix[0][1]`. Empty segments are skipped, so both `""`
//! and `"/"` address the root.
use std::fmt::Display;

use crate::errors::{Error, ParserResult};
use crate::path_error;
use crate::predicate::Predicate;

/// Segments are separated by slashes
const PATH_SEPARATOR: char = '/';
/// Marks an attribute segment
const ATTRIBUTE_MARKER: char = '@';
/// Selects the current container as a whole
const WILDCARD: &str = "*";

/// A single step within a [QueryPath]
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Member access on an object
    Key(String),
    /// The whole of the current container
    Wildcard,
    /// Explicit attribute (field) access on an object
    Attribute(String),
    /// Element access on an array. Negative indexes are kept so they can be reported
    Index(i64),
    /// Keep only the entries which satisfy a predicate
    Filter(Predicate),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Wildcard => write!(f, "{}", WILDCARD),
            PathSegment::Attribute(name) => write!(f, "{}{}", ATTRIBUTE_MARKER, name),
            PathSegment::Index(index) => write!(f, "[{}]", index),
            PathSegment::Filter(predicate) => write!(f, "[{}]", predicate),
        }
    }
}

/// A parsed query path
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPath {
    /// The text the path was parsed from
    source: String,
    /// The segments, in evaluation order
    segments: Vec<PathSegment>,
}

impl QueryPath {
    /// Parse a path expression
    pub fn parse(path: &str) -> ParserResult<QueryPath> {
        let mut segments = vec![];
        for part in split_path(path)? {
            parse_part(path, part, &mut segments)?;
        }
        Ok(QueryPath {
            source: path.to_string(),
            segments,
        })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// The original text of the path
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Display for QueryPath {
    /// Paths display in a normalised form, one segment per separator
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{}", PATH_SEPARATOR);
        }
        for segment in &self.segments {
            write!(f, "{}{}", PATH_SEPARATOR, segment)?;
        }
        Ok(())
    }
}

/// Split on separators outside of brackets, dropping empty parts. Parts are kept exactly as
/// written, whitespace included
fn split_path(path: &str) -> ParserResult<Vec<&str>> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0;
    for (offset, c) in path.char_indices() {
        match c {
            '[' => depth += 1,
            ']' if depth == 0 => return path_error!(path, "unexpected ']'"),
            ']' => depth -= 1,
            PATH_SEPARATOR if depth == 0 => {
                parts.push(&path[start..offset]);
                start = offset + 1;
            }
            _ => (),
        }
    }
    if depth != 0 {
        return path_error!(path, "unclosed '['");
    }
    parts.push(&path[start..]);
    Ok(parts.into_iter().filter(|p| !p.is_empty()).collect())
}

/// Turn a single part of a path into one or more segments
fn parse_part(path: &str, part: &str, segments: &mut Vec<PathSegment>) -> ParserResult<()> {
    if let Some(name) = part.strip_prefix(ATTRIBUTE_MARKER) {
        if name.is_empty() {
            return path_error!(path, "missing attribute name after '@'");
        }
        if name.contains('[') {
            return path_error!(path, format!("attribute '{}' cannot be indexed", name));
        }
        segments.push(PathSegment::Attribute(name.to_string()));
        return Ok(());
    }

    let (name, mut rest) = match part.find('[') {
        Some(offset) => part.split_at(offset),
        None => (part, ""),
    };
    match name {
        "" => (),
        WILDCARD => segments.push(PathSegment::Wildcard),
        key => segments.push(PathSegment::Key(key.to_string())),
    }

    while !rest.is_empty() {
        let Some(close) = closing_bracket(rest) else {
            return path_error!(path, "unclosed '['");
        };
        let condition = rest[1..close].trim();
        if condition.is_empty() {
            return path_error!(path, "empty brackets");
        }
        segments.push(parse_condition(path, condition)?);
        rest = rest[close + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return path_error!(path, format!("unexpected '{}' after ']'", rest));
        }
    }
    Ok(())
}

/// Bracketed text is either an array index or a predicate
fn parse_condition(path: &str, condition: &str) -> ParserResult<PathSegment> {
    if let Ok(index) = condition.parse::<i64>() {
        return Ok(PathSegment::Index(index));
    }
    Predicate::parse(condition)
        .map(PathSegment::Filter)
        .map_err(|err| match err {
            Error::InvalidPath { reason, .. } => Error::InvalidPath {
                path: path.to_string(),
                reason,
            },
            other => other,
        })
}

/// Find the byte offset of the bracket which closes the one at the start of `text`
fn closing_bracket(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => (),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{PathSegment, QueryPath};
    use crate::errors::Error;
    use crate::predicate::{Operand, Operator};

    #[test]
    fn should_split_simple_paths() {
        let path = QueryPath::parse("/data/users/*").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("data".to_string()),
                PathSegment::Key("users".to_string()),
                PathSegment::Wildcard
            ]
        );
    }

    #[test]
    fn empty_paths_should_address_the_root() {
        assert!(QueryPath::parse("").unwrap().is_root());
        assert!(QueryPath::parse("/").unwrap().is_root());
        assert_eq!(QueryPath::parse("//a//").unwrap().segments().len(), 1);
    }

    #[test]
    fn should_parse_indexes_and_filters() {
        let path = QueryPath::parse("/users[0]/items[price>10]").unwrap();
        let segments = path.segments();
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[1], PathSegment::Index(0));
        match &segments[3] {
            PathSegment::Filter(predicate) => {
                assert_eq!(predicate.operand, Operand::Field("price".to_string()));
                assert_eq!(predicate.operator, Operator::Gt);
                assert_eq!(predicate.literal, "10");
            }
            other => panic!("expected a filter, got {:?}", other),
        }
    }

    #[test]
    fn separators_inside_brackets_should_not_split() {
        let path = QueryPath::parse("/links[@href='http://a/b']").unwrap();
        assert_eq!(path.segments().len(), 2);
    }

    #[test]
    fn should_chain_bracket_groups() {
        let path = QueryPath::parse("matrix[1][-1]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("matrix".to_string()),
                PathSegment::Index(1),
                PathSegment::Index(-1)
            ]
        );
    }

    #[test]
    fn should_keep_whitespace_within_keys() {
        let path = QueryPath::parse("/ a/b /[0]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key(" a".to_string()),
                PathSegment::Key("b ".to_string()),
                PathSegment::Index(0)
            ]
        );
    }

    #[test]
    fn should_parse_attributes() {
        let path = QueryPath::parse("/user/@id").unwrap();
        assert_eq!(path.segments()[1], PathSegment::Attribute("id".to_string()));
    }

    #[test]
    fn should_reject_malformed_paths() {
        for bad in ["/a[0", "/a]", "/a[]", "/@", "/a[0]b", "/a[name~1]", "/@a[0]"] {
            match QueryPath::parse(bad) {
                Err(Error::InvalidPath { path, .. }) => assert_eq!(path, bad),
                other => panic!("expected '{}' to be rejected, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn should_display_normalised_paths() {
        let path = QueryPath::parse("data//users[ @name = \"Bob\" ]").unwrap();
        assert_eq!(path.to_string(), "/data/users/[@name='Bob']");
        assert_eq!(path.as_str(), "data//users[ @name = \"Bob\" ]");
        assert_eq!(QueryPath::parse("").unwrap().to_string(), "/");
    }
}
