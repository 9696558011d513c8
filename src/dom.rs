//! The DOM parser
//!
//! A recursive-descent parser which pulls [Token]s from a [Lexer] one at a time (holding a single
//! token of lookahead) and builds a complete [JsonValue] tree. Parsing stops at the first error;
//! there's no recovery and no partial result.
use std::io::BufReader;
use std::mem;

use log::{debug, trace};

use crate::coords::Coords;
use crate::decoders::{DecoderSelector, Encoding};
use crate::errors::{Details, Error, ParserResult};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{parser_error, JsonMap, JsonValue};

/// Default maximum nesting depth for objects and arrays
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Main JSON parser struct
#[derive(Debug, Clone)]
pub struct Parser {
    decoders: DecoderSelector,
    encoding: Encoding,
    max_depth: usize,
}

impl Default for Parser {
    /// The default encoding is Utf-8
    fn default() -> Self {
        Self {
            decoders: Default::default(),
            encoding: Default::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Holds the token stream for a single parse, along with one token of lookahead
struct Cursor<'a> {
    lexer: Lexer<'a>,
    peeked: Token,
}

impl<'a> Cursor<'a> {
    fn new(mut lexer: Lexer<'a>) -> Self {
        let peeked = lexer.next_token();
        Cursor { lexer, peeked }
    }

    /// Look at the next token without consuming it
    fn peek(&self) -> &Token {
        &self.peeked
    }

    /// Consume the next token
    fn next(&mut self) -> Token {
        let following = self.lexer.next_token();
        mem::replace(&mut self.peeked, following)
    }
}

impl Parser {
    /// Create a new instance of the parser using a specific [Encoding]
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Default::default()
        }
    }

    /// Set the maximum permitted nesting depth for objects and arrays
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The currently configured [Encoding], used by [Parser::parse_bytes]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The currently configured maximum nesting depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Parse a string slice
    pub fn parse_str(&self, str: &str) -> ParserResult<JsonValue> {
        debug!("parsing {} bytes of text", str.len());
        let mut chars = str.chars();
        self.parse(&mut chars)
    }

    /// Parse a byte buffer, decoding it using the configured [Encoding]. The whole buffer is
    /// checked against the encoding up front, so bad bytes anywhere (including after a complete
    /// value) are reported as [Details::InvalidEncoding]
    pub fn parse_bytes(&self, bytes: &[u8]) -> ParserResult<JsonValue> {
        debug!("parsing {} bytes as {:?}", bytes.len(), self.encoding);
        match self.encoding {
            Encoding::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => self.parse_str(text),
                Err(err) => invalid_encoding(bytes, err.valid_up_to()),
            },
            Encoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => invalid_encoding(bytes, offset),
                None => {
                    let mut reader = BufReader::new(bytes);
                    let mut chars = self.decoders.new_decoder(&mut reader, self.encoding);
                    self.parse(&mut chars)
                }
            },
        }
    }

    /// Parse a stream of `char`s. Exactly one value must be present, optionally surrounded by
    /// whitespace
    pub fn parse(&self, chars: &mut dyn Iterator<Item = char>) -> ParserResult<JsonValue> {
        let mut cursor = Cursor::new(Lexer::new(chars));
        let value = self.parse_value(&mut cursor, 0)?;
        let trailing = cursor.next();
        if !trailing.is_end() {
            return parser_error!(
                Details::TrailingContent(trailing.text.clone()),
                trailing.span.start
            );
        }
        debug!("parsed a top level {}", value.kind_name());
        Ok(value)
    }

    /// Parse a single value. `depth` is the number of containers currently open
    fn parse_value(&self, cursor: &mut Cursor, depth: usize) -> ParserResult<JsonValue> {
        let token = cursor.next();
        match token.kind {
            TokenKind::StartObject => {
                self.check_depth(depth, token.span.start)?;
                self.parse_object(cursor, depth + 1)
            }
            TokenKind::StartArray => {
                self.check_depth(depth, token.span.start)?;
                self.parse_array(cursor, depth + 1)
            }
            TokenKind::String => Ok(JsonValue::String(decode_string(&token)?)),
            TokenKind::Number => Ok(JsonValue::Number(decode_number(&token)?)),
            TokenKind::True => Ok(JsonValue::Boolean(true)),
            TokenKind::False => Ok(JsonValue::Boolean(false)),
            TokenKind::Null => Ok(JsonValue::Null),
            TokenKind::EndOfInput => {
                parser_error!(Details::UnexpectedEndOfInput, token.span.start)
            }
            _ => parser_error!(
                Details::UnexpectedToken(token.text.clone()),
                token.span.start
            ),
        }
    }

    fn check_depth(&self, depth: usize, coords: Coords) -> ParserResult<()> {
        if depth >= self.max_depth {
            return Err(Error::MaxDepthExceeded {
                max: self.max_depth,
                coords,
            });
        }
        Ok(())
    }

    /// An object is just a list of comma separated KV pairs. The opening brace has already been
    /// consumed
    fn parse_object(&self, cursor: &mut Cursor, depth: usize) -> ParserResult<JsonValue> {
        trace!("object at depth {} from {}", depth, cursor.lexer.coords());
        let mut map = JsonMap::new();
        if cursor.peek().kind == TokenKind::EndObject {
            cursor.next();
            return Ok(JsonValue::Object(map));
        }
        loop {
            let key = cursor.next();
            match key.kind {
                TokenKind::String if key.text.starts_with('"') => (),
                TokenKind::EndOfInput => {
                    return parser_error!(Details::UnexpectedEndOfInput, key.span.start)
                }
                _ => return parser_error!(Details::ExpectedKey(key.to_string()), key.span.start),
            }
            let key_text = decode_string(&key)?;

            let colon = cursor.next();
            match colon.kind {
                TokenKind::Colon => (),
                TokenKind::EndOfInput => {
                    return parser_error!(Details::UnexpectedEndOfInput, colon.span.start)
                }
                _ => {
                    return parser_error!(
                        Details::ExpectedColon(colon.to_string()),
                        colon.span.start
                    )
                }
            }

            let value = self.parse_value(cursor, depth)?;
            map.insert(key_text, value);

            let separator = cursor.next();
            match separator.kind {
                TokenKind::Comma => (),
                TokenKind::EndObject => return Ok(JsonValue::Object(map)),
                TokenKind::EndOfInput => {
                    return parser_error!(Details::UnexpectedEndOfInput, separator.span.start)
                }
                _ => {
                    return parser_error!(
                        Details::ExpectedCommaOrEnd('}', separator.to_string()),
                        separator.span.start
                    )
                }
            }
        }
    }

    /// An array is just a list of comma separated values. The opening bracket has already been
    /// consumed
    fn parse_array(&self, cursor: &mut Cursor, depth: usize) -> ParserResult<JsonValue> {
        trace!("array at depth {} from {}", depth, cursor.lexer.coords());
        let mut values: Vec<JsonValue> = vec![];
        if cursor.peek().kind == TokenKind::EndArray {
            cursor.next();
            return Ok(JsonValue::Array(values));
        }
        loop {
            values.push(self.parse_value(cursor, depth)?);
            let separator = cursor.next();
            match separator.kind {
                TokenKind::Comma => (),
                TokenKind::EndArray => return Ok(JsonValue::Array(values)),
                TokenKind::EndOfInput => {
                    return parser_error!(Details::UnexpectedEndOfInput, separator.span.start)
                }
                _ => {
                    return parser_error!(
                        Details::ExpectedCommaOrEnd(']', separator.to_string()),
                        separator.span.start
                    )
                }
            }
        }
    }
}

/// Build an encoding error for the byte at `offset`, positioned at the character it would have
/// been had it decoded
fn invalid_encoding(bytes: &[u8], offset: usize) -> ParserResult<JsonValue> {
    let mut coords = Coords::default();
    String::from_utf8_lossy(&bytes[..offset])
        .chars()
        .for_each(|c| coords.advance(c));
    coords.advance(char::REPLACEMENT_CHARACTER);
    parser_error!(Details::InvalidEncoding(offset), coords)
}

/// Coordinates of the character `offset` characters past the start of a single-line lexeme
fn offset_coords(start: Coords, offset: usize) -> Coords {
    Coords {
        absolute: start.absolute + offset,
        line: start.line,
        column: start.column + offset,
    }
}

/// Strip the quotes from a string lexeme and decode any escape sequences within it
fn decode_string(token: &Token) -> ParserResult<String> {
    let start = token.span.start;
    let mut chars = token.text.chars().enumerate();
    match chars.next() {
        Some((_, '"')) => (),
        _ => return parser_error!(Details::UnexpectedToken(token.text.clone()), start),
    }

    let mut decoded = String::with_capacity(token.text.len());
    while let Some((offset, c)) = chars.next() {
        match c {
            '"' => return Ok(decoded),
            '\\' => match chars.next() {
                Some((_, '"')) => decoded.push('"'),
                Some((_, '\\')) => decoded.push('\\'),
                Some((_, '/')) => decoded.push('/'),
                Some((_, 'b')) => decoded.push('\u{08}'),
                Some((_, 'f')) => decoded.push('\u{0c}'),
                Some((_, 'n')) => decoded.push('\n'),
                Some((_, 'r')) => decoded.push('\r'),
                Some((_, 't')) => decoded.push('\t'),
                Some((_, 'u')) => {
                    let high = read_hex_quad(&mut chars, offset_coords(start, offset))?;
                    decoded.push(decode_code_point(high, &mut chars, start, offset)?);
                }
                Some((_, other)) => {
                    return parser_error!(
                        Details::InvalidEscapeSequence(format!("\\{}", other)),
                        offset_coords(start, offset)
                    )
                }
                None => break,
            },
            c if (c as u32) < 0x20 => {
                return parser_error!(
                    Details::ControlCharacterInString(c),
                    offset_coords(start, offset)
                )
            }
            c => decoded.push(c),
        }
    }
    parser_error!(Details::UnterminatedString, start)
}

/// Read the four hex digits following a `\u`
fn read_hex_quad(
    chars: &mut impl Iterator<Item = (usize, char)>,
    coords: Coords,
) -> ParserResult<u32> {
    let mut digits = String::with_capacity(4);
    for _ in 0..4 {
        match chars.next() {
            Some((_, c)) if c.is_ascii_hexdigit() => digits.push(c),
            Some((_, c)) => {
                digits.push(c);
                return parser_error!(
                    Details::InvalidUnicodeEscapeSequence(format!("\\u{}", digits)),
                    coords
                );
            }
            None => return parser_error!(Details::UnterminatedString, coords),
        }
    }
    match u32::from_str_radix(&digits, 16) {
        Ok(code) => Ok(code),
        Err(_) => parser_error!(
            Details::InvalidUnicodeEscapeSequence(format!("\\u{}", digits)),
            coords
        ),
    }
}

/// Turn a `\uXXXX` code unit into a `char`, pulling a trailing low surrogate from the input if
/// the first unit is a high surrogate
fn decode_code_point(
    high: u32,
    chars: &mut impl Iterator<Item = (usize, char)>,
    start: Coords,
    offset: usize,
) -> ParserResult<char> {
    let coords = offset_coords(start, offset);
    let invalid = |code: u32| {
        parser_error!(
            Details::InvalidUnicodeEscapeSequence(format!("\\u{:04X}", code)),
            coords
        )
    };
    match high {
        0xD800..=0xDBFF => {
            let has_low =
                matches!(chars.next(), Some((_, '\\'))) && matches!(chars.next(), Some((_, 'u')));
            if !has_low {
                return invalid(high);
            }
            let low = read_hex_quad(chars, coords)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return invalid(low);
            }
            let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(combined).map_or_else(|| invalid(combined), Ok)
        }
        0xDC00..=0xDFFF => invalid(high),
        code => char::from_u32(code).map_or_else(|| invalid(code), Ok),
    }
}

/// Convert a numeric lexeme, checking it against the JSON number grammar first since the lexer
/// accepts a much looser superset
fn decode_number(token: &Token) -> ParserResult<f64> {
    let text = token.text.as_str();
    if !is_valid_number(text) {
        return parser_error!(
            Details::InvalidNumericRepresentation(text.to_string()),
            token.span.start
        );
    }
    match fast_float::parse::<f64, _>(text) {
        Ok(n) if n.is_infinite() => parser_error!(
            Details::NumericOutOfRange(text.to_string()),
            token.span.start
        ),
        Ok(n) if n == 0.0 && has_non_zero_mantissa(text) => parser_error!(
            Details::NumericOutOfRange(text.to_string()),
            token.span.start
        ),
        Ok(n) => Ok(n),
        Err(_) => parser_error!(
            Details::InvalidNumericRepresentation(text.to_string()),
            token.span.start
        ),
    }
}

/// Checks a lexeme against `-? (0 | [1-9][0-9]*) (\.[0-9]+)? ([eE][+-]?[0-9]+)?`
fn is_valid_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = digits_from(i),
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        let end = digits_from(i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
    }
    if let Some(b'e' | b'E') = bytes.get(i) {
        i += 1;
        if let Some(b'+' | b'-') = bytes.get(i) {
            i += 1;
        }
        let end = digits_from(i);
        if end == i {
            return false;
        }
        i = end;
    }
    i == bytes.len()
}

/// Checks whether the significant digits (ignoring any exponent) contain anything but zeros
fn has_non_zero_mantissa(text: &str) -> bool {
    text.chars()
        .take_while(|c| *c != 'e' && *c != 'E')
        .any(|c| ('1'..='9').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::{is_valid_number, Parser};
    use crate::decoders::Encoding;
    use crate::errors::{Details, Error};
    use crate::JsonValue;

    #[test]
    fn should_parse_char_iterators_directly() {
        let source = r#"{
            "test" : 1232.0,
            "some other" : "thasdasd",
            "a bool" : true,
            "an array" : [1,2,3,4,5.8,6,7.2,7,8,10]
        }"#;
        let parser = Parser::default();
        let parsed = parser.parse(&mut source.chars());
        assert!(parsed.is_ok())
    }

    #[test]
    fn should_accept_valid_number_grammar() {
        for n in ["0", "-0", "12", "-12.5", "0.25", "1e10", "1E+2", "2.5e-3"] {
            assert!(is_valid_number(n), "{} should be valid", n);
        }
    }

    #[test]
    fn should_reject_invalid_number_grammar() {
        for n in ["-", "01", "123.", ".5", "1e", "1e+", "1.2.3", "--1", "1-2", "0x10"] {
            assert!(!is_valid_number(n), "{} should be invalid", n);
        }
    }

    #[test]
    fn should_enforce_the_maximum_depth() {
        let parser = Parser::default().with_max_depth(2);
        assert!(parser.parse_str("[[1]]").is_ok());
        match parser.parse_str("[[[1]]]") {
            Err(Error::MaxDepthExceeded { max, coords }) => {
                assert_eq!(max, 2);
                assert_eq!(coords.column, 3);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn should_report_trailing_content_position() {
        let result = Parser::default().parse_str("{}\n  x");
        match result {
            Err(Error::Parse { details, coords }) => {
                assert_eq!(details, Details::TrailingContent("x".to_string()));
                assert_eq!(coords.line, 2);
                assert_eq!(coords.column, 3);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn should_parse_ascii_bytes() {
        let parser = Parser::with_encoding(Encoding::Ascii);
        assert_eq!(
            parser.parse_bytes(b"[true, null]"),
            Ok(JsonValue::Array(vec![JsonValue::Boolean(true), JsonValue::Null]))
        );
    }

    #[test]
    fn should_position_encoding_errors_at_the_bad_byte() {
        match Parser::default().parse_bytes(b"{\n\"\xc3\xa9\": \"a\xc3(\"}") {
            Err(Error::Parse { details, coords }) => {
                assert_eq!(details, Details::InvalidEncoding(10));
                assert_eq!(coords.line, 2);
                assert_eq!(coords.column, 8);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn should_combine_surrogate_pairs() {
        let parsed = Parser::default().parse_str(r#""\ud83d\ude00""#);
        assert_eq!(parsed, Ok(JsonValue::String("\u{1F600}".to_string())));
    }

    #[test]
    fn should_reject_lone_surrogates() {
        let parsed = Parser::default().parse_str(r#""\udc00""#);
        assert!(matches!(
            parsed,
            Err(Error::Parse {
                details: Details::InvalidUnicodeEscapeSequence(_),
                ..
            })
        ));
    }
}
