//! The lexer operates over a stream of `char`s produced by some flavour of iterator. When parsing
//! from a `&str` the iterator is just [str::chars], but raw bytes need decoding first.
//!
//! The [DecoderSelector] implemented within this module is used to instantiate new `char`
//! iterators over byte buffers, based on different encodings. (Currently only ASCII and UTF-8 are
//! supported).
use chisel_decoders::{ascii::AsciiDecoder, utf8::Utf8Decoder};
use std::io::BufRead;

/// Enumeration of different supported encoding types
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
}

/// A struct that is essentially a factory for creating new instances of [char] iterators,
/// based on a specified encoding type
#[derive(Debug, Default, Copy, Clone)]
pub(crate) struct DecoderSelector {}

impl DecoderSelector {
    /// Create and return an instance of a given byte decoder / char iterator based on a specific
    /// encoding
    pub fn new_decoder<'a, Buffer: BufRead>(
        &'a self,
        buffer: &'a mut Buffer,
        encoding: Encoding,
    ) -> Box<dyn Iterator<Item = char> + 'a> {
        match encoding {
            Encoding::Ascii => Box::new(AsciiDecoder::new(buffer)),
            Encoding::Utf8 => Box::new(Utf8Decoder::new(buffer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecoderSelector, Encoding};
    use crate::reader_from_bytes;
    use std::io::BufReader;

    #[test]
    fn should_decode_multibyte_utf8() {
        let mut reader = reader_from_bytes!("{\"é\":\"你好\"}");
        let selector = DecoderSelector::default();
        let chars: String = selector.new_decoder(&mut reader, Encoding::Utf8).collect();
        assert_eq!(chars, "{\"é\":\"你好\"}");
    }

    #[test]
    fn should_decode_plain_ascii() {
        let mut reader = reader_from_bytes!("[1, 2, 3]");
        let selector = DecoderSelector::default();
        let chars: String = selector.new_decoder(&mut reader, Encoding::Ascii).collect();
        assert_eq!(chars, "[1, 2, 3]");
    }
}
