//! The lexer turns a stream of `char`s into a stream of [Token]s, one token at a time.
//!
//! The lexer is deliberately permissive: it never fails. Strings are captured verbatim (quotes and
//! escapes included) and numbers are captured using a superset of the JSON number alphabet. It is
//! the job of the parser to reject anything which isn't valid JSON, using the [Span] attached to
//! each token to report where things went wrong.
use std::fmt::{Display, Formatter};
use std::iter::Peekable;

use crate::coords::{Coords, Span};

/// Default capacity for the lexeme buffer
const DEFAULT_BUFFER_CAPACITY: usize = 64;

/// Enumeration of the different kinds of token the lexer can produce
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TokenKind {
    EndOfInput,
    String,
    Number,
    True,
    False,
    Null,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Comma,
    Colon,
}

/// A token consists of a [TokenKind], the raw lexeme it was built from and the [Span] it covers
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What sort of token this is
    pub kind: TokenKind,
    /// The raw lexeme. For strings this includes the surrounding quotes (if present) and any
    /// escape sequences in their original form
    pub text: String,
    /// Where the token was found
    pub span: Span,
}

impl Token {
    /// Checks whether this is the end of input token
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfInput
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}

/// Convenience macro for building tokens along with their positional information
macro_rules! token {
    ($k:expr, $t:expr, $s:expr, $e:expr) => {
        Token {
            kind: $k,
            text: $t,
            span: Span { start: $s, end: $e },
        }
    };
    ($k:expr, $t:expr, $s:expr) => {
        Token {
            kind: $k,
            text: $t,
            span: Span { start: $s, end: $s },
        }
    };
}

/// A forward-only lexer with a single character of lookahead
pub struct Lexer<'a> {
    /// The source of characters
    chars: Peekable<&'a mut dyn Iterator<Item = char>>,
    /// [Coords] of the most recently consumed character
    coords: Coords,
    /// Scratch buffer used to build up lexemes
    buffer: String,
    /// Set once the end of input token has been handed out through the [Iterator] interface
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over a given `char` iterator
    pub fn new(chars: &'a mut dyn Iterator<Item = char>) -> Self {
        Lexer {
            chars: chars.peekable(),
            coords: Coords::default(),
            buffer: String::with_capacity(DEFAULT_BUFFER_CAPACITY),
            exhausted: false,
        }
    }

    /// The [Coords] of the most recently consumed character
    pub fn coords(&self) -> Coords {
        self.coords
    }

    /// Produce the next token. Once the input is exhausted every call returns a
    /// [TokenKind::EndOfInput] token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        match self.advance() {
            None => token!(TokenKind::EndOfInput, String::new(), self.coords),
            Some(c) => {
                let start = self.coords;
                match c {
                    '{' => token!(TokenKind::StartObject, c.to_string(), start),
                    '}' => token!(TokenKind::EndObject, c.to_string(), start),
                    '[' => token!(TokenKind::StartArray, c.to_string(), start),
                    ']' => token!(TokenKind::EndArray, c.to_string(), start),
                    ',' => token!(TokenKind::Comma, c.to_string(), start),
                    ':' => token!(TokenKind::Colon, c.to_string(), start),
                    '"' => self.match_string(start),
                    '-' | '0'..='9' => self.match_number(c, start),
                    c if is_word_char(c) => self.match_word(c, start),
                    c => token!(TokenKind::String, c.to_string(), start),
                }
            }
        }
    }

    /// Consume a single character, updating the current coordinates
    fn advance(&mut self) -> Option<char> {
        let next = self.chars.next();
        if let Some(c) = next {
            self.coords.advance(c);
        }
        next
    }

    /// Skip over any insignificant whitespace
    fn skip_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\n' | '\r') = self.chars.peek() {
            self.advance();
        }
    }

    /// Capture a string lexeme, quotes and escapes included. A backslash always captures the
    /// following character, so an escaped quote never terminates the string. Running out of
    /// input just yields whatever has been captured so far
    fn match_string(&mut self, start: Coords) -> Token {
        self.buffer.clear();
        self.buffer.push('"');
        while let Some(c) = self.advance() {
            self.buffer.push(c);
            match c {
                '"' => break,
                '\\' => {
                    if let Some(escaped) = self.advance() {
                        self.buffer.push(escaped);
                    }
                }
                _ => (),
            }
        }
        token!(TokenKind::String, self.buffer.clone(), start, self.coords)
    }

    /// Capture a numeric lexeme. No attempt is made to validate the number here
    fn match_number(&mut self, first: char, start: Coords) -> Token {
        self.buffer.clear();
        self.buffer.push(first);
        while let Some(&c) = self.chars.peek() {
            match c {
                '0'..='9' | '.' | 'e' | 'E' | '+' | '-' => {
                    self.advance();
                    self.buffer.push(c);
                }
                _ => break,
            }
        }
        token!(TokenKind::Number, self.buffer.clone(), start, self.coords)
    }

    /// Capture a bare word, which is only valid if it's one of the three JSON literals. Anything
    /// else is handed on as an (unquoted) string lexeme for the parser to reject
    fn match_word(&mut self, first: char, start: Coords) -> Token {
        self.buffer.clear();
        self.buffer.push(first);
        while let Some(&c) = self.chars.peek() {
            if is_word_char(c) || c.is_ascii_digit() {
                self.advance();
                self.buffer.push(c);
            } else {
                break;
            }
        }
        let kind = match self.buffer.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => TokenKind::String,
        };
        token!(kind, self.buffer.clone(), start, self.coords)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    /// Yields every token up to and including the end of input token, then stops
    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let token = self.next_token();
        self.exhausted = token.is_end();
        Some(token)
    }
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
