//! Lexical analyzer for VHDL source text.
//!
//! Converts source text into a sequence of [`Token`]s, handling case-insensitive
//! keywords, based literals, string/character/bit-string literals, block and line
//! comments, and extended identifiers. Lexing stops at the first malformed token.

use crate::token::{lookup_keyword, Token, VhdlToken};
use crate::ScanError;
use vunit_source::{FileId, Span};

/// Lexes the given source text into a vector of tokens.
///
/// Whitespace and comments are skipped. The returned vector always ends with
/// a [`VhdlToken::Eof`] token.
pub fn lex(source: &str, file: FileId) -> Result<Vec<Token>, ScanError> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
}

impl<'a> Lexer<'a> {
    fn lex_all(&mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: VhdlToken::Eof,
                    span: Span::new(self.file, self.pos as u32, self.pos as u32),
                });
                return Ok(tokens);
            }
            let token = self.next_token()?;
            tokens.push(token);
        }
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn token(&self, kind: VhdlToken, start: usize) -> Token {
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn error(&self, msg: &str, start: usize) -> ScanError {
        ScanError {
            message: msg.to_string(),
            span: self.span_from(start),
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ScanError> {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.peek() == b'-' && self.peek_at(1) == b'-' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            // VHDL-2008 block comments do not nest.
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        return Err(self.error("unterminated block comment", start));
                    }
                    if self.peek() == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<Token, ScanError> {
        let start = self.pos;
        let b = self.peek();

        // A tick followed by one character and another tick is a character
        // literal unless it is immediately followed by a name character, as in
        // `t'(a)` or `sig'event`.
        if b == b'\'' && self.peek_at(2) == b'\'' && !is_ident_char(self.peek_at(3)) {
            self.pos += 3;
            return Ok(self.token(VhdlToken::CharLiteral, start));
        }
        if is_ident_start(b) {
            return self.lex_identifier_or_keyword(start);
        }
        if b == b'\\' {
            return self.lex_extended_identifier(start);
        }
        if b.is_ascii_digit() {
            return self.lex_number(start);
        }
        if b == b'"' {
            self.lex_quoted(start)?;
            return Ok(self.token(VhdlToken::StringLiteral, start));
        }
        Ok(self.lex_delimiter(start))
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Result<Token, ScanError> {
        while is_ident_char(self.peek()) {
            self.pos += 1;
        }
        let text = &self.source[start..self.pos];

        // Bit string literal prefix: B"...", X"...", 12UX"..." is handled in lex_number.
        if self.peek() == b'"' && is_bit_string_base(text) {
            self.lex_quoted(start)?;
            return Ok(self.token(VhdlToken::BitStringLiteral, start));
        }

        let lower = String::from_utf8_lossy(text).to_ascii_lowercase();
        let kind = lookup_keyword(&lower).unwrap_or(VhdlToken::Identifier);
        Ok(self.token(kind, start))
    }

    fn lex_extended_identifier(&mut self, start: usize) -> Result<Token, ScanError> {
        self.pos += 1;
        while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
            if self.source[self.pos] == b'\\' {
                if self.peek_at(1) == b'\\' {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return Ok(self.token(VhdlToken::ExtendedIdentifier, start));
            }
            self.pos += 1;
        }
        Err(self.error("unterminated extended identifier", start))
    }

    /// Consumes a `"`-delimited literal starting at the current position.
    fn lex_quoted(&mut self, start: usize) -> Result<(), ScanError> {
        self.pos += 1;
        loop {
            if self.pos >= self.source.len() || self.peek() == b'\n' {
                return Err(self.error("unterminated string literal", start));
            }
            if self.peek() == b'"' {
                if self.peek_at(1) != b'"' {
                    self.pos += 1;
                    return Ok(());
                }
                self.pos += 1;
            }
            self.pos += 1;
        }
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, ScanError> {
        self.eat_digits();

        if self.peek() == b'#' {
            self.pos += 1;
            while self.peek().is_ascii_hexdigit() || matches!(self.peek(), b'_' | b'.') {
                self.pos += 1;
            }
            if self.peek() != b'#' {
                return Err(self.error("expected closing '#' in based literal", start));
            }
            self.pos += 1;
            self.eat_exponent();
            return Ok(self.token(VhdlToken::Number, start));
        }

        // Sized bit string literal: 8x"ff"
        if is_ident_start(self.peek()) {
            let prefix_start = self.pos;
            while is_ident_char(self.peek()) {
                self.pos += 1;
            }
            if self.peek() == b'"' && is_bit_string_base(&self.source[prefix_start..self.pos]) {
                self.lex_quoted(start)?;
                return Ok(self.token(VhdlToken::BitStringLiteral, start));
            }
            self.pos = prefix_start;
        }

        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            self.pos += 1;
            self.eat_digits();
        }
        self.eat_exponent();
        Ok(self.token(VhdlToken::Number, start))
    }

    fn eat_digits(&mut self) {
        while self.peek().is_ascii_digit() || self.peek() == b'_' {
            self.pos += 1;
        }
    }

    fn eat_exponent(&mut self) {
        if matches!(self.peek(), b'e' | b'E')
            && (self.peek_at(1).is_ascii_digit()
                || (matches!(self.peek_at(1), b'+' | b'-') && self.peek_at(2).is_ascii_digit()))
        {
            self.pos += 2;
            self.eat_digits();
        }
    }

    fn lex_delimiter(&mut self, start: usize) -> Token {
        let b = self.peek();
        self.pos += 1;
        let kind = match b {
            b'(' => VhdlToken::LeftParen,
            b')' => VhdlToken::RightParen,
            b';' => VhdlToken::Semicolon,
            b',' => VhdlToken::Comma,
            b'.' => VhdlToken::Dot,
            b'\'' => VhdlToken::Tick,
            b':' => {
                if self.peek() == b'=' {
                    self.pos += 1;
                    VhdlToken::Delimiter
                } else {
                    VhdlToken::Colon
                }
            }
            _ => VhdlToken::Delimiter,
        };
        self.token(kind, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_bit_string_base(text: &[u8]) -> bool {
    let lower = text.to_ascii_lowercase();
    matches!(
        lower.as_slice(),
        b"b" | b"o" | b"x" | b"d" | b"ub" | b"uo" | b"ux" | b"sb" | b"so" | b"sx"
    )
}
