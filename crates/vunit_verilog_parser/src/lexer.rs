//! Lexical analyzer for Verilog and SystemVerilog source text.
//!
//! Converts source text into a sequence of [`Token`]s, handling case-sensitive
//! keywords, sized/based literals (`4'b1010`), string literals with C-style
//! escapes, escaped identifiers and compiler directives. Line ends are kept as
//! [`VerilogToken::Newline`] tokens because `` `define `` bodies end at them;
//! a backslash directly before a line end continues the line.

use crate::token::{lookup_keyword, Token, VerilogToken};
use crate::ScanError;
use vunit_source::{FileId, Span};

/// Lexes the given source text into a vector of tokens.
///
/// The returned vector always ends with a [`VerilogToken::Eof`] token.
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
                    kind: VerilogToken::Eof,
                    text: String::new(),
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

    fn slice(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn token(&self, kind: VerilogToken, start: usize) -> Token {
        Token {
            kind,
            text: self.slice(start, self.pos),
            span: self.span_from(start),
        }
    }

    fn error(&self, msg: &str, start: usize) -> ScanError {
        ScanError {
            message: msg.to_string(),
            span: self.span_from(start),
        }
    }

    /// Length of a line end at the current position, if any.
    fn newline_len(&self, offset: usize) -> usize {
        match (self.peek_at(offset), self.peek_at(offset + 1)) {
            (b'\n', _) => 1,
            (b'\r', b'\n') => 2,
            _ => 0,
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ScanError> {
        loop {
            while matches!(self.peek(), b' ' | b'\t' | b'\x0c')
                || (self.peek() == b'\r' && self.peek_at(1) != b'\n')
            {
                self.pos += 1;
            }
            if self.peek() == b'\\' && self.newline_len(1) > 0 {
                self.pos += 1 + self.newline_len(1);
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.source.len() && self.newline_len(0) == 0 {
                    self.pos += 1;
                }
                continue;
            }
            // Block comments do not nest in Verilog.
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

        let newline = self.newline_len(0);
        if newline > 0 {
            self.pos += newline;
            return Ok(self.token(VerilogToken::Newline, start));
        }
        if is_ident_start(b) {
            return Ok(self.lex_identifier_or_keyword(start));
        }
        if b == b'\\' {
            return Ok(self.lex_escaped_identifier(start));
        }
        if b == b'$' && is_ident_start(self.peek_at(1)) {
            self.pos += 1;
            self.eat_ident_chars();
            return Ok(self.token(VerilogToken::SystemIdentifier, start));
        }
        if b == b'`' && is_ident_start(self.peek_at(1)) {
            self.pos += 1;
            self.eat_ident_chars();
            return Ok(Token {
                kind: VerilogToken::Directive,
                text: self.slice(start + 1, self.pos),
                span: self.span_from(start),
            });
        }
        if b.is_ascii_digit() {
            self.lex_number();
            return Ok(self.token(VerilogToken::Number, start));
        }
        if b == b'\'' && is_base_char(self.peek_at(1)) {
            self.lex_based_value();
            return Ok(self.token(VerilogToken::Number, start));
        }
        if b == b'"' {
            return self.lex_string(start);
        }
        Ok(self.lex_operator(start))
    }

    fn eat_ident_chars(&mut self) {
        while is_ident_char(self.peek()) {
            self.pos += 1;
        }
    }

    fn lex_identifier_or_keyword(&mut self, start: usize) -> Token {
        self.eat_ident_chars();
        let token = self.token(VerilogToken::Identifier, start);
        match lookup_keyword(&token.text) {
            Some(kind) => Token { kind, ..token },
            None => token,
        }
    }

    /// `\name` up to the next whitespace; the text excludes the backslash.
    fn lex_escaped_identifier(&mut self, start: usize) -> Token {
        self.pos += 1;
        while self.pos < self.source.len() && !self.peek().is_ascii_whitespace() {
            self.pos += 1;
        }
        Token {
            kind: VerilogToken::Identifier,
            text: self.slice(start + 1, self.pos),
            span: self.span_from(start),
        }
    }

    fn lex_number(&mut self) {
        while self.peek().is_ascii_digit() || self.peek() == b'_' {
            self.pos += 1;
        }
        if self.peek() == b'.' && self.peek_at(1).is_ascii_digit() {
            self.pos += 1;
            while self.peek().is_ascii_digit() || self.peek() == b'_' {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), b'e' | b'E')
            && (self.peek_at(1).is_ascii_digit()
                || (matches!(self.peek_at(1), b'+' | b'-') && self.peek_at(2).is_ascii_digit()))
        {
            self.pos += 2;
            while self.peek().is_ascii_digit() {
                self.pos += 1;
            }
        }
        // Sized literal: 8'hff, 4 'b1010
        let mut lookahead = 0;
        while matches!(self.peek_at(lookahead), b' ' | b'\t') {
            lookahead += 1;
        }
        if self.peek_at(lookahead) == b'\'' && is_base_char(self.peek_at(lookahead + 1)) {
            self.pos += lookahead;
            self.lex_based_value();
        }
    }

    /// `'b1010`, `'sh1F`, `'0`, `'x` and friends.
    fn lex_based_value(&mut self) {
        self.pos += 1;
        if matches!(self.peek(), b's' | b'S') {
            self.pos += 1;
        }
        if matches!(self.peek(), b'b' | b'B' | b'o' | b'O' | b'd' | b'D' | b'h' | b'H') {
            self.pos += 1;
            while matches!(self.peek(), b' ' | b'\t') {
                self.pos += 1;
            }
        }
        while self.peek().is_ascii_alphanumeric() || matches!(self.peek(), b'_' | b'?') {
            self.pos += 1;
        }
    }

    fn lex_string(&mut self, start: usize) -> Result<Token, ScanError> {
        self.pos += 1;
        let mut text = Vec::new();
        loop {
            match self.peek() {
                b'"' => {
                    self.pos += 1;
                    return Ok(Token {
                        kind: VerilogToken::StringLiteral,
                        text: String::from_utf8_lossy(&text).into_owned(),
                        span: self.span_from(start),
                    });
                }
                b'\\' if self.peek_at(1) != 0 => {
                    let newline = self.newline_len(1);
                    if newline == 0 {
                        text.push(self.peek_at(1));
                    }
                    self.pos += 1 + newline.max(1);
                }
                b'\n' => return Err(self.error("unterminated string literal", start)),
                _ if self.pos >= self.source.len() => {
                    return Err(self.error("unterminated string literal", start));
                }
                c => {
                    text.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn lex_operator(&mut self, start: usize) -> Token {
        let b = self.peek();
        self.pos += 1;
        let kind = match b {
            b'(' => VerilogToken::LeftParen,
            b')' => VerilogToken::RightParen,
            b'[' => VerilogToken::LeftBracket,
            b']' => VerilogToken::RightBracket,
            b'{' => VerilogToken::LeftBrace,
            b'}' => VerilogToken::RightBrace,
            b',' => VerilogToken::Comma,
            b';' => VerilogToken::Semicolon,
            b':' if self.peek() == b':' => {
                self.pos += 1;
                VerilogToken::DoubleColon
            }
            b':' if matches!(self.peek(), b'=' | b'/') => {
                self.pos += 1;
                VerilogToken::Operator
            }
            b':' => VerilogToken::Colon,
            b'#' if self.peek() == b'#' => {
                self.pos += 1;
                VerilogToken::Operator
            }
            b'#' => VerilogToken::Hash,
            b'=' if matches!(self.peek(), b'=' | b'>') => {
                while matches!(self.peek(), b'=' | b'>' | b'?') {
                    self.pos += 1;
                }
                VerilogToken::Operator
            }
            b'=' => VerilogToken::Equals,
            b'`' if matches!(self.peek(), b'"' | b'`') => {
                self.pos += 1;
                VerilogToken::Operator
            }
            _ => {
                while is_operator_char(self.peek()) {
                    self.pos += 1;
                }
                VerilogToken::Operator
            }
        };
        self.token(kind, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

fn is_base_char(b: u8) -> bool {
    matches!(
        b,
        b'b' | b'B' | b'o' | b'O' | b'd' | b'D' | b'h' | b'H' | b's' | b'S'
            | b'0' | b'1' | b'x' | b'X' | b'z' | b'Z'
    )
}

fn is_operator_char(b: u8) -> bool {
    matches!(
        b,
        b'+' | b'-' | b'*' | b'/' | b'%' | b'<' | b'>' | b'!' | b'&' | b'|' | b'^' | b'~'
            | b'?' | b'@' | b'.'
    ) || (b == b'=')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_ok(source: &str) -> Vec<Token> {
        lex(source, FileId::from_raw(0)).unwrap()
    }

    fn kinds(source: &str) -> Vec<VerilogToken> {
        lex_ok(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input() {
        assert_eq!(kinds(""), vec![VerilogToken::Eof]);
    }

    #[test]
    fn newlines_are_tokens() {
        assert_eq!(
            kinds("a\r\nb\n"),
            vec![
                VerilogToken::Identifier,
                VerilogToken::Newline,
                VerilogToken::Identifier,
                VerilogToken::Newline,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn line_continuation_is_whitespace() {
        assert_eq!(
            kinds("`define X a \\\n b\n"),
            vec![
                VerilogToken::Directive,
                VerilogToken::Identifier,
                VerilogToken::Identifier,
                VerilogToken::Identifier,
                VerilogToken::Newline,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn directive_text_excludes_backtick() {
        let tokens = lex_ok("`include \"defs.svh\"");
        assert_eq!(tokens[0].kind, VerilogToken::Directive);
        assert_eq!(tokens[0].text, "include");
        assert_eq!(tokens[1].kind, VerilogToken::StringLiteral);
        assert_eq!(tokens[1].text, "defs.svh");
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// module hidden;\n/* package p; */ endmodule"),
            vec![VerilogToken::Newline, VerilogToken::Endmodule, VerilogToken::Eof]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("8'hFF 4 'b1010 'sd5 '0 1.5e-3 42"),
            vec![
                VerilogToken::Number,
                VerilogToken::Number,
                VerilogToken::Number,
                VerilogToken::Number,
                VerilogToken::Number,
                VerilogToken::Number,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn package_scope_and_parameters() {
        assert_eq!(
            kinds("pkg::item #(.W(8))"),
            vec![
                VerilogToken::Identifier,
                VerilogToken::DoubleColon,
                VerilogToken::Identifier,
                VerilogToken::Hash,
                VerilogToken::LeftParen,
                VerilogToken::Operator,
                VerilogToken::Identifier,
                VerilogToken::LeftParen,
                VerilogToken::Number,
                VerilogToken::RightParen,
                VerilogToken::RightParen,
                VerilogToken::Eof
            ]
        );
    }

    #[test]
    fn escaped_and_system_identifiers() {
        let tokens = lex_ok("\\bus[0] $display");
        assert_eq!(tokens[0].kind, VerilogToken::Identifier);
        assert_eq!(tokens[0].text, "bus[0]");
        assert_eq!(tokens[1].kind, VerilogToken::SystemIdentifier);
    }

    #[test]
    fn string_escapes() {
        let tokens = lex_ok(r#""say \"hi\"""#);
        assert_eq!(tokens[0].text, "say \"hi\"");
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = lex("\"open\nmodule m;", FileId::from_raw(0)).unwrap_err();
        assert_eq!(err.message, "unterminated string literal");
    }
}
