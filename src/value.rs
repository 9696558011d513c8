//! Accessors, conversions and formatting for [JsonValue]
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

use log::trace;

use crate::errors::{Error, ParserResult};
use crate::pointer::{element_at, JsonPointer};
use crate::serializer::{self, Serializer};
use crate::{path_error, JsonMap, JsonValue};

/// Separates the steps of a [JsonValue::select] path
const PATH_SEPARATOR: char = '/';
/// Projects the rest of a [JsonValue::select] path over every element of an array
const WILDCARD: &str = "*";

impl JsonValue {
    /// A short, human readable name for the variant, used within error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            JsonValue::Object(_) => "object",
            JsonValue::Array(_) => "array",
            JsonValue::String(_) => "string",
            JsonValue::Number(_) => "number",
            JsonValue::Boolean(_) => "boolean",
            JsonValue::Null => "null",
        }
    }

    /// Checks whether the value is [JsonValue::Null]
    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    /// The underlying map, if the value is an object
    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// The elements, if the value is an array
    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(values) => Some(values),
            _ => None,
        }
    }

    /// The string contents, if the value is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The numeric value, if the value is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean value, if the value is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Look up a member of an object. Always `None` for anything other than an object
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Resolve an RFC 6901 pointer string such as `/a/0/b` against this value
    pub fn pointer(&self, pointer: &str) -> ParserResult<&JsonValue> {
        JsonPointer::parse(pointer)?.resolve(self)
    }

    /// Walk a slash separated path of object keys and array indexes. A `*` against an array
    /// applies the rest of the path to every element, collecting the results of those elements
    /// for which it succeeds (elements where it fails are skipped). An empty path selects the
    /// value itself.
    ///
    /// Unlike [crate::query], this produces a new value rather than borrowing from the tree.
    pub fn select(&self, path: &str) -> ParserResult<JsonValue> {
        let path = path.strip_prefix(PATH_SEPARATOR).unwrap_or(path);
        if path.is_empty() {
            return Ok(self.clone());
        }
        let (head, rest) = path.split_once(PATH_SEPARATOR).unwrap_or((path, ""));
        trace!("selecting '{}' from {}", head, self.kind_name());
        match self {
            JsonValue::Object(map) => match map.get(head) {
                Some(child) => child.select(rest),
                None => Err(Error::KeyNotFound {
                    key: head.to_string(),
                }),
            },
            JsonValue::Array(values) if head == WILDCARD => Ok(values
                .iter()
                .filter_map(|v| v.select(rest).ok())
                .collect()),
            JsonValue::Array(values) => match head.parse::<i64>() {
                Ok(index) => element_at(values, index)?.select(rest),
                Err(_) => path_error!(path, format!("'{}' is not an array index", head)),
            },
            scalar => Err(Error::TypeMismatch {
                segment: head.to_string(),
                found: scalar.kind_name(),
            }),
        }
    }

    /// The textual representation used when comparing values within query predicates. Strings
    /// are their raw (unquoted) contents, everything else is its compact serialised form
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            JsonValue::String(s) => Cow::Borrowed(s.as_str()),
            JsonValue::Number(n) => Cow::Owned(serializer::format_number(*n)),
            JsonValue::Boolean(true) => Cow::Borrowed("true"),
            JsonValue::Boolean(false) => Cow::Borrowed("false"),
            JsonValue::Null => Cow::Borrowed("null"),
            other => Cow::Owned(Serializer::compact().serialize(other)),
        }
    }
}

impl Display for JsonValue {
    /// Values display in their compact serialised form
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&Serializer::compact().serialize(self))
    }
}

impl Default for JsonValue {
    fn default() -> Self {
        JsonValue::Null
    }
}

impl From<bool> for JsonValue {
    fn from(value: bool) -> Self {
        JsonValue::Boolean(value)
    }
}

impl From<f64> for JsonValue {
    fn from(value: f64) -> Self {
        JsonValue::Number(value)
    }
}

impl From<i32> for JsonValue {
    fn from(value: i32) -> Self {
        JsonValue::Number(value as f64)
    }
}

impl From<i64> for JsonValue {
    fn from(value: i64) -> Self {
        JsonValue::Number(value as f64)
    }
}

impl From<&str> for JsonValue {
    fn from(value: &str) -> Self {
        JsonValue::String(value.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(value: String) -> Self {
        JsonValue::String(value)
    }
}

impl From<Vec<JsonValue>> for JsonValue {
    fn from(values: Vec<JsonValue>) -> Self {
        JsonValue::Array(values)
    }
}

impl From<JsonMap> for JsonValue {
    fn from(map: JsonMap) -> Self {
        JsonValue::Object(map)
    }
}

impl<K: Into<String>> FromIterator<(K, JsonValue)> for JsonValue {
    /// Collect key/value pairs into an object. Later duplicates replace earlier ones
    fn from_iter<T: IntoIterator<Item = (K, JsonValue)>>(iter: T) -> Self {
        JsonValue::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl FromIterator<JsonValue> for JsonValue {
    fn from_iter<T: IntoIterator<Item = JsonValue>>(iter: T) -> Self {
        JsonValue::Array(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::Error;
    use crate::{parsed, JsonValue};

    #[test]
    fn objects_compare_by_content_not_order() {
        let a: JsonValue = vec![("x", JsonValue::from(1)), ("y", JsonValue::from(2))]
            .into_iter()
            .collect();
        let b: JsonValue = vec![("y", JsonValue::from(2)), ("x", JsonValue::from(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn text_should_strip_quotes_from_strings_only() {
        assert_eq!(JsonValue::from("Alice").text(), "Alice");
        assert_eq!(JsonValue::from(1500).text(), "1500");
        assert_eq!(JsonValue::from(true).text(), "true");
        assert_eq!(JsonValue::Null.text(), "null");
        let array: JsonValue = vec![JsonValue::from("a"), JsonValue::from(1.5)]
            .into_iter()
            .collect();
        assert_eq!(array.text(), r#"["a",1.5]"#);
    }

    #[test]
    fn select_should_project_wildcards_over_arrays() {
        let root = parsed!(r#"{"xs": [{"n": 1}, {"m": 2}, {"n": 3}, 4]}"#);
        assert_eq!(root.select("/xs/*/n").unwrap().to_string(), "[1,3]");
        assert_eq!(root.select("xs/*").unwrap(), *root.get("xs").unwrap());
        assert_eq!(root.select("/xs/2/n"), Ok(JsonValue::from(3)));
        assert_eq!(root.select(""), Ok(root.clone()));
    }

    #[test]
    fn select_should_report_bad_steps() {
        let root = parsed!(r#"{"xs": [1, 2], "s": "text"}"#);
        assert_eq!(
            root.select("/nope"),
            Err(Error::KeyNotFound {
                key: "nope".to_string()
            })
        );
        assert_eq!(
            root.select("/xs/2"),
            Err(Error::IndexOutOfRange {
                index: 2,
                length: 2
            })
        );
        assert!(matches!(
            root.select("/xs/first"),
            Err(Error::InvalidPath { .. })
        ));
        assert_eq!(
            root.select("/s/len"),
            Err(Error::TypeMismatch {
                segment: "len".to_string(),
                found: "string"
            })
        );
    }

    #[test]
    fn accessors_should_only_match_their_own_variant() {
        let value = JsonValue::from("text");
        assert_eq!(value.as_str(), Some("text"));
        assert!(value.as_f64().is_none());
        assert!(value.get("anything").is_none());
        assert_eq!(value.kind_name(), "string");
    }
}
