//! A representation of a JSON Pointer with associated operations, loosely following RFC 6901.
//!
//! Pointers are the simple, programmatic way of addressing a value: a list of object keys and
//! array indexes, with no wildcards or predicates. (See [crate::paths] for the richer query
//! syntax.)
use std::{borrow::Cow, collections::VecDeque, fmt::Display};

use log::trace;

use crate::errors::{Error, ParserResult};
use crate::{path_error, JsonValue};

/// Each pointer is a series of segments delineated by a separator char
const PATH_SEPARATOR: char = '/';
/// As per the RFC, we need to encode any tilde characters as ~0
const ENCODED_TILDE: &str = "~0";
/// As per the RFC, we need to encode any slash characters as ~1
const ENCODED_SLASH: &str = "~1";

/// Each pointer is made of one of three different component types
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPointerComponent<'a> {
    /// Root element of a pointer
    Root,
    /// A named element within a pointer. Against an array, names are read as indexes
    Name(Cow<'a, str>),
    /// An indexed element within a pointer
    Index(usize),
}

impl<'a> Display for JsonPointerComponent<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, ""),
            Self::Name(s) => write!(
                f,
                "{}",
                &s.replace('~', ENCODED_TILDE).replace('/', ENCODED_SLASH)
            ),
            Self::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A structure representing a complete pointer, comprising multiple [JsonPointerComponent]s
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonPointer<'a> {
    /// The components that go together to make up the pointer
    components: VecDeque<JsonPointerComponent<'a>>,
}

impl<'a> JsonPointer<'a> {
    /// Build a pointer from a list of plain (unencoded) segments. Segments written as canonical
    /// decimal numbers become indexes, everything else is a name
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> JsonPointer<'static> {
        let mut pointer = JsonPointer::default();
        for segment in segments.iter().map(AsRef::as_ref) {
            match segment.parse::<usize>() {
                Ok(index) if index.to_string() == segment => pointer.push_index(index),
                _ => pointer.push_name(segment.to_string()),
            }
        }
        pointer
    }

    /// Parse an RFC 6901 string representation such as `/a~1b/0`. The empty string is the
    /// pointer to the whole document
    pub fn parse(pointer: &'a str) -> ParserResult<JsonPointer<'a>> {
        let mut result = JsonPointer::default();
        if pointer.is_empty() {
            return Ok(result);
        }
        let Some(rest) = pointer.strip_prefix(PATH_SEPARATOR) else {
            return path_error!(pointer, "pointers must start with '/'");
        };
        for segment in rest.split(PATH_SEPARATOR) {
            if segment.contains('~') {
                if !is_valid_encoding(segment) {
                    return path_error!(pointer, format!("invalid escape in '{}'", segment));
                }
                result.push_name(segment.replace(ENCODED_SLASH, "/").replace(ENCODED_TILDE, "~"));
            } else {
                if result.is_empty() {
                    result.components.push_back(JsonPointerComponent::Root)
                }
                result
                    .components
                    .push_back(JsonPointerComponent::Name(Cow::Borrowed(segment)));
            }
        }
        Ok(result)
    }

    /// Returns the number of [JsonPointerComponent]s within the pointer
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Checks whether the pointer is the empty pointer
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Push a new [JsonPointerComponent::Name] onto the end of the pointer
    pub fn push_name(&mut self, name: String) {
        if self.is_empty() {
            self.components.push_back(JsonPointerComponent::Root)
        }
        self.components
            .push_back(JsonPointerComponent::Name(Cow::Owned(name)))
    }

    /// Push a new [JsonPointerComponent::Index] onto the end of the pointer
    pub fn push_index(&mut self, index: usize) {
        if self.is_empty() {
            self.components.push_back(JsonPointerComponent::Root)
        }
        self.components
            .push_back(JsonPointerComponent::Index(index))
    }

    /// Pop the last component off the back of the pointer
    pub fn pop(&mut self) -> Option<JsonPointerComponent<'a>> {
        let popped = self.components.pop_back();
        if self.components.len() == 1 {
            self.components.clear();
        }
        popped
    }

    /// Serialise the pointer into a string representation that's compliant with RFC 6901
    pub fn as_str(&self) -> Cow<'a, str> {
        if self.is_empty() {
            return Cow::Owned("".to_string());
        }
        Cow::Owned(
            self.components
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<String>>()
                .join("/"),
        )
    }

    /// Walk down into a value, one component at a time.
    ///
    /// - Names look up object members, or are read as an index against an array
    /// - Anything applied to a scalar is an invalid path
    pub fn resolve<'v>(&self, root: &'v JsonValue) -> ParserResult<&'v JsonValue> {
        let mut current = root;
        for component in self.components.iter() {
            trace!("resolving pointer component '{}'", component);
            current = match (component, current) {
                (JsonPointerComponent::Root, _) => current,
                (JsonPointerComponent::Name(name), JsonValue::Object(map)) => {
                    match map.get(name.as_ref()) {
                        Some(child) => child,
                        None => {
                            return Err(Error::KeyNotFound {
                                key: name.to_string(),
                            })
                        }
                    }
                }
                (JsonPointerComponent::Index(index), JsonValue::Object(map)) => {
                    match map.get(&index.to_string()) {
                        Some(child) => child,
                        None => {
                            return Err(Error::KeyNotFound {
                                key: index.to_string(),
                            })
                        }
                    }
                }
                (JsonPointerComponent::Name(name), JsonValue::Array(values)) => {
                    match name.parse::<i64>() {
                        Ok(index) => element_at(values, index)?,
                        Err(_) => {
                            return path_error!(
                                self.dotted(),
                                format!("'{}' is not an array index", name)
                            )
                        }
                    }
                }
                (JsonPointerComponent::Index(index), JsonValue::Array(values)) => {
                    element_at(values, *index as i64)?
                }
                (_, scalar) => {
                    return path_error!(
                        self.dotted(),
                        format!("cannot descend into a {}", scalar.kind_name())
                    )
                }
            };
        }
        Ok(current)
    }

    /// The components joined by periods, as used within error messages
    fn dotted(&self) -> String {
        self.components
            .iter()
            .filter(|c| **c != JsonPointerComponent::Root)
            .map(|c| match c {
                JsonPointerComponent::Name(s) => s.to_string(),
                other => other.to_string(),
            })
            .collect::<Vec<String>>()
            .join(".")
    }
}

/// Bounds checked array access
pub(crate) fn element_at<T>(values: &[T], index: i64) -> ParserResult<&T> {
    if index < 0 || index as usize >= values.len() {
        return Err(Error::IndexOutOfRange {
            index,
            length: values.len(),
        });
    }
    Ok(&values[index as usize])
}

/// A tilde must always be followed by either a 0 or a 1
fn is_valid_encoding(segment: &str) -> bool {
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return false;
        }
    }
    true
}

impl<'a> Display for JsonPointer<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
