//! General error types for the parser, pointer and query stages
use std::fmt::{Display, Formatter};

use thiserror::Error as ThisError;

use crate::coords::Coords;

/// Global result type used throughout the crate
pub type ParserResult<T> = Result<T, Error>;

/// Details of why a parse failed
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    /// A token turned up where no value may start
    UnexpectedToken(String),
    /// The input ran out before a complete value was read
    UnexpectedEndOfInput,
    /// Something other than whitespace follows the top level value
    TrailingContent(String),
    /// Object members must start with a string key
    ExpectedKey(String),
    /// A key was not followed by a colon
    ExpectedColon(String),
    /// A member or element was not followed by a separator or the closing character
    ExpectedCommaOrEnd(char, String),
    /// A string literal without a closing quote
    UnterminatedString,
    /// An escape sequence other than those allowed by RFC 8259
    InvalidEscapeSequence(String),
    /// A malformed `\uXXXX` sequence, or an unpaired surrogate
    InvalidUnicodeEscapeSequence(String),
    /// A number lexeme which doesn't satisfy the JSON number grammar
    InvalidNumericRepresentation(String),
    /// A well formed number which can't be represented as a finite, non-truncated double
    NumericOutOfRange(String),
    /// Raw control characters must be escaped within strings
    ControlCharacterInString(char),
    /// Input bytes which aren't valid in the selected encoding, along with their byte offset
    InvalidEncoding(usize),
}

impl Display for Details {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Details::UnexpectedToken(t) => write!(f, "unexpected token: {}", t),
            Details::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            Details::TrailingContent(t) => write!(f, "unexpected token at end of input: {}", t),
            Details::ExpectedKey(t) => write!(f, "expected string key, got {}", t),
            Details::ExpectedColon(t) => write!(f, "expected ':', got {}", t),
            Details::ExpectedCommaOrEnd(c, t) => write!(f, "expected ',' or '{}', got {}", c, t),
            Details::UnterminatedString => write!(f, "unterminated string"),
            Details::InvalidEscapeSequence(s) => write!(f, "invalid escape sequence: {}", s),
            Details::InvalidUnicodeEscapeSequence(s) => {
                write!(f, "invalid unicode escape sequence: {}", s)
            }
            Details::InvalidNumericRepresentation(s) => write!(f, "invalid number: {}", s),
            Details::NumericOutOfRange(s) => write!(f, "number out of range: {}", s),
            Details::ControlCharacterInString(c) => {
                write!(f, "unescaped control character U+{:04X} in string", *c as u32)
            }
            Details::InvalidEncoding(offset) => {
                write!(f, "invalid byte sequence at byte offset {}", offset)
            }
        }
    }
}

/// The general error enumeration. Parse failures carry [Coords], query and pointer failures carry
/// the offending key, index or path
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed JSON text
    #[error("parse error at line {}, column {}: {details}", .coords.line, .coords.column)]
    Parse { details: Details, coords: Coords },

    /// An object didn't contain the requested key
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// An array index was negative or past the end of the array
    #[error("index out of range: index {index}, length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    /// A path or predicate that couldn't be understood
    #[error("invalid path: {path} ({reason})")]
    InvalidPath { path: String, reason: String },

    /// A path segment applied to a value of the wrong kind
    #[error("type mismatch: cannot apply '{segment}' to {found}")]
    TypeMismatch { segment: String, found: &'static str },

    /// Nesting went deeper than the configured maximum
    #[error("maximum nesting depth of {max} exceeded at line {}, column {}", .coords.line, .coords.column)]
    MaxDepthExceeded { max: usize, coords: Coords },
}

impl Error {
    /// The line associated with a parse or depth error
    pub fn line(&self) -> Option<usize> {
        self.coords().map(|c| c.line)
    }

    /// The column associated with a parse or depth error
    pub fn column(&self) -> Option<usize> {
        self.coords().map(|c| c.column)
    }

    /// The [Coords] associated with a parse or depth error
    pub fn coords(&self) -> Option<Coords> {
        match self {
            Error::Parse { coords, .. } | Error::MaxDepthExceeded { coords, .. } => Some(*coords),
            _ => None,
        }
    }

    /// The message without any positional prefix
    pub fn message(&self) -> String {
        match self {
            Error::Parse { details, .. } => details.to_string(),
            Error::MaxDepthExceeded { max, .. } => {
                format!("maximum nesting depth of {} exceeded", max)
            }
            other => other.to_string(),
        }
    }

    /// Checks whether the error came out of the parser
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Error::Parse { .. } | Error::MaxDepthExceeded { .. })
    }
}

/// Build an `Err(Error::Parse)` from a set of [Details] and some [Coords]
#[macro_export]
macro_rules! parser_error {
    ($details: expr, $coords: expr) => {
        Err($crate::errors::Error::Parse {
            details: $details,
            coords: $coords,
        })
    };
}

/// Build an `Err(Error::InvalidPath)` from a path and a reason
#[macro_export]
macro_rules! path_error {
    ($path: expr, $reason: expr) => {
        Err($crate::errors::Error::InvalidPath {
            path: $path.to_string(),
            reason: $reason.to_string(),
        })
    };
}
