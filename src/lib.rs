//! # chisel-jsonq
//!
//! A small JSON toolkit: a permissive lexer feeding a strict recursive-descent parser, an
//! insertion-ordered value model, compact and pretty serialization, and an XPath-like query
//! language for picking values back out of a parsed document.
//!
//! ```rust
//! use chisel_jsonq::{parse, query, stringify};
//!
//! let root = parse(r#"{"data":{"users":[{"name":"Alice"},{"name":"Bob"}]}}"#).unwrap();
//! let alice = query(&root, "/data/users[@name='Alice']").unwrap();
//! assert_eq!(alice.to_string(), r#"[{"name":"Alice"}]"#);
//! assert_eq!(stringify(&root), r#"{"data":{"users":[{"name":"Alice"},{"name":"Bob"}]}}"#);
//! ```
use indexmap::IndexMap;
use log::debug;

pub mod coords;
pub mod decoders;
pub mod dom;
pub mod errors;
pub mod lexer;
pub mod paths;
pub mod pointer;
pub mod predicate;
pub mod query;
pub mod serializer;
#[cfg(test)]
mod test_macros;
mod value;

pub use crate::dom::Parser;
pub use crate::errors::{Details, Error, ParserResult};
pub use crate::paths::{PathSegment, QueryPath};
pub use crate::pointer::JsonPointer;
pub use crate::query::Selection;
pub use crate::serializer::Serializer;

/// The map type backing [JsonValue::Object]. Keys keep the order in which they were first seen
pub type JsonMap = IndexMap<String, JsonValue>;

/// Basic enumeration of different Json values
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    /// Map of values
    Object(JsonMap),
    /// Array of values
    Array(Vec<JsonValue>),
    /// Canonical string value
    String(String),
    /// Numeric value. JSON only has the one numeric type, so everything is a double
    Number(f64),
    /// Canonical boolean value
    Boolean(bool),
    /// Canonical null value
    Null,
}

/// Parse a string slice into a [JsonValue]
pub fn parse(text: &str) -> ParserResult<JsonValue> {
    Parser::default().parse_str(text)
}

/// Parse a UTF-8 encoded byte buffer into a [JsonValue]
pub fn parse_bytes(bytes: &[u8]) -> ParserResult<JsonValue> {
    Parser::default().parse_bytes(bytes)
}

/// Checks whether some text is a valid JSON document
pub fn validate(text: &str) -> bool {
    parse(text).is_ok()
}

/// Serialise a [JsonValue] into its compact textual form
pub fn stringify(value: &JsonValue) -> String {
    Serializer::compact().serialize(value)
}

/// Parse some text and then render it using the default (two space) indentation
pub fn pretty_print(text: &str) -> ParserResult<String> {
    let value = parse(text)?;
    Ok(Serializer::pretty(serializer::DEFAULT_INDENT).serialize(&value))
}

/// Parse some text and then walk down into it, one key (or array index) at a time
pub fn get_value_by_path<S: AsRef<str>>(text: &str, path: &[S]) -> ParserResult<JsonValue> {
    let root = parse(text)?;
    let pointer = JsonPointer::from_segments(path);
    debug!("resolving pointer {} against parsed input", pointer);
    pointer.resolve(&root).cloned()
}

/// Evaluate an XPath-like path expression against a previously parsed [JsonValue]
pub fn query<'a>(root: &'a JsonValue, path: &str) -> ParserResult<Selection<'a>> {
    let path = QueryPath::parse(path)?;
    query::evaluate(root, &path)
}

/// Parse some text, evaluate a path expression against it and hand back an owned copy of the
/// result
pub fn query_str(text: &str, path: &str) -> ParserResult<JsonValue> {
    let root = parse(text)?;
    query(&root, path).map(|selection| selection.to_value())
}

#[cfg(test)]
mod tests {
    use crate::{get_value_by_path, pretty_print, query_str, validate, Error, JsonValue};

    #[test]
    fn should_validate_documents() {
        assert!(validate(r#"{"key": "value"}"#));
        assert!(validate("42"));
        assert!(!validate(r#"{"key": "value",}"#));
        assert!(!validate(""));
    }

    #[test]
    fn should_pretty_print_nested_documents() {
        let pretty = pretty_print(r#"{"outer":{"inner":42}}"#).unwrap();
        assert_eq!(pretty, "{\n  \"outer\": {\n    \"inner\": 42\n  }\n}");
    }

    #[test]
    fn should_report_out_of_range_indexes() {
        let result = get_value_by_path("[1,2,3]", &["3"]);
        assert_eq!(
            result,
            Err(Error::IndexOutOfRange {
                index: 3,
                length: 3
            })
        );
    }

    #[test]
    fn should_walk_nested_paths() {
        let value = get_value_by_path(r#"{"outer": {"inner": [10, 20]}}"#, &["outer", "inner", "1"]);
        assert_eq!(value, Ok(JsonValue::Number(20.0)));
    }

    #[test]
    fn should_query_raw_text() {
        let value = query_str(r#"{"a":{"b":[1,2,3]}}"#, "/a/b[2]").unwrap();
        assert_eq!(value, JsonValue::Number(3.0));
    }
}
