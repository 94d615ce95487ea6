//! Low-level byte-by-byte parser for Newick text.
//!
//! This module provides [ByteParser] for parsing text-based formats with support
//! for peeking, consuming, comment skipping, and quote-aware label parsing.
//! Used as the foundation of the [NewickParser](crate::newick::NewickParser).

use crate::parser::parsing_error::ParsingError;

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser over an in-memory buffer.
///
/// # Features
/// - Peek and consume single bytes
/// - Whitespace and `[...]` comment skipping
/// - Quote-aware label parsing (single quotes with `''` escaping)
/// - Labels decoded as UTF-8
/// - Context extraction for error reporting
///
/// # Example
/// ```
/// use nexprune::parser::ByteParser;
///
/// let mut parser = ByteParser::for_str("  [comment] 'Wilson''s_Storm-petrel':0.5");
/// parser.skip_comment_and_whitespace().unwrap();
/// let label = parser.parse_label(b"(),:;").unwrap();
/// assert_eq!(label, "Wilson's_Storm-petrel");
/// assert!(parser.consume_if(b':'));
/// ```
pub struct ByteParser {
    /// The owned byte data being parsed
    input: Vec<u8>,
    /// Current position in the input
    pos: usize,
}

impl ByteParser {
    /// Creates a new `ByteParser` owning the given bytes.
    pub fn new(input: Vec<u8>) -> Self {
        Self { input, pos: 0 }
    }

    /// Creates a new `ByteParser` from a byte slice by copying it into a Vec.
    pub fn for_bytes(input: &[u8]) -> Self {
        Self::new(input.to_vec())
    }

    /// Creates a new `ByteParser` from a string by copying it into a Vec.
    pub fn for_str(input: &str) -> Self {
        Self::new(input.as_bytes().to_vec())
    }

    /// Peeks at the current byte without consuming it.
    ///
    /// # Returns
    /// * `Some(u8)` - The current byte if available
    /// * `None` - If at end of data (EOF)
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    /// Skips (consumes) all consecutive whitespace characters.
    ///
    /// Whitespace includes: space (' '), tab ('\t'), newline ('\n'), and carriage return ('\r').
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b == b' ' || b == b'\t' || b == b'\n' || b == b'\r' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Skips (consumes) a comment `[...]` if present.
    ///
    /// # Returns
    /// * `Ok(true)` - A comment was found and consumed
    /// * `Ok(false)` - No comment at current position
    /// * `Err(ParsingError)` - Comment was opened but never closed
    pub fn skip_comment(&mut self) -> Result<bool, ParsingError> {
        if !self.consume_if(b'[') {
            return Ok(false);
        }

        while let Some(b) = self.next_byte() {
            if b == b']' {
                return Ok(true);
            }
        }

        Err(ParsingError::unclosed_comment(self))
    }

    /// Skips (consumes) all consecutive whitespace and comments.
    ///
    /// # Errors
    /// Returns an error if an unclosed comment is encountered.
    pub fn skip_comment_and_whitespace(&mut self) -> Result<(), ParsingError> {
        self.skip_whitespace();

        while self.skip_comment()? {
            self.skip_whitespace();
        }

        Ok(())
    }

    /// Checks if the current byte equals `ch`.
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Consumes the current byte if it equals `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        let start = self.pos.min(self.input.len());
        let end = (self.pos + k).min(self.input.len());
        String::from_utf8_lossy(&self.input[start..end]).into_owned()
    }

    /// Parses a label (quoted or unquoted) with the given delimiter set.
    ///
    /// Skips leading whitespace and comments, then detects whether the label is
    /// quoted (single quotes) or unquoted. An unquoted label may be empty.
    ///
    /// # Arguments
    /// * `delimiters` - Bytes that end an unquoted label
    ///
    /// # Errors
    /// Returns an error if a quoted label is not closed or the label is not UTF-8
    pub fn parse_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        self.skip_comment_and_whitespace()?;

        if self.peek_is(b'\'') {
            self.parse_quoted_label()
        } else {
            self.parse_unquoted_label(delimiters)
        }
    }

    /// Parses a quoted label enclosed in single quotes with escape support.
    ///
    /// Assumes the opening quote has not been consumed yet. Single quotes within
    /// the label are escaped by doubling them (e.g., `'Wilson''s'` becomes `Wilson's`).
    /// Underscores and whitespace inside the quotes are kept as they are.
    pub fn parse_quoted_label(&mut self) -> Result<String, ParsingError> {
        let start = self.pos;
        self.pos += 1; // consume opening '

        let mut label = Vec::new();
        loop {
            match self.next_byte() {
                Some(b'\'') if self.peek_is(b'\'') => {
                    label.push(b'\'');
                    self.pos += 1;
                }
                Some(b'\'') => break,
                Some(b) => label.push(b),
                None => {
                    self.pos = start;
                    return Err(ParsingError::unclosed_quote(self));
                }
            }
        }

        self.decode(label, start)
    }

    /// Parses an unquoted label until any of the given delimiters is encountered.
    ///
    /// Underscores are part of the label, not a stand-in for spaces.
    pub fn parse_unquoted_label(&mut self, delimiters: &[u8]) -> Result<String, ParsingError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if delimiters.contains(&b) {
                break;
            }
            self.pos += 1;
        }

        self.decode(self.input[start..self.pos].to_vec(), start)
    }

    fn decode(&mut self, bytes: Vec<u8>, start: usize) -> Result<String, ParsingError> {
        String::from_utf8(bytes).map_err(|_| {
            self.pos = start;
            ParsingError::invalid_encoding(self)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parsing_error::ParsingErrorType;

    #[test]
    fn test_unquoted_label_keeps_underscores() {
        let mut parser = ByteParser::for_str("Homo_sapiens:0.1");
        assert_eq!(parser.parse_label(b":,);").unwrap(), "Homo_sapiens");
        assert!(parser.peek_is(b':'));
    }

    #[test]
    fn test_unclosed_comment() {
        let mut parser = ByteParser::for_str("[never closed");
        let err = parser.skip_comment_and_whitespace().unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::UnclosedComment);
    }

    #[test]
    fn test_unclosed_quote_points_at_opening_quote() {
        let mut parser = ByteParser::for_str("  'Kea");
        let err = parser.parse_label(b",)").unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::UnclosedQuote);
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_utf8_label() {
        let mut parser = ByteParser::for_str("Tūī,");
        assert_eq!(parser.parse_label(b",").unwrap(), "Tūī");
    }

    #[test]
    fn test_invalid_utf8_label() {
        let mut parser = ByteParser::for_bytes(&[b'A', 0xff, b',']);
        let err = parser.parse_label(b",").unwrap_err();
        assert_eq!(err.kind(), &ParsingErrorType::InvalidEncoding);
    }
}
