//! Lazy tokenizer for Spanner DDL.
//!
//! The lexer is an `Iterator` over `Result<Token, LexError>`. It yields a single `Eof`
//! token at the end and stops after the first error. Restarting means building a new
//! `Lexer` over the same text; there is no hidden state besides the cursor.
use crate::error::{LexError, LexErrorKind};
use crate::ir::is_valid_identifier;

use super::token::{line_col, Keyword, Punct, Span, Token, TokenKind};

#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, bytes: src.as_bytes(), pos: 0, done: false }
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn error(&self, offset: usize, kind: LexErrorKind) -> LexError {
        let (line, column) = line_col(self.src, offset);
        LexError { offset, line, column, kind }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;
        let start = self.pos;
        let Some(b) = self.peek_at(0) else {
            return Ok(Token { kind: TokenKind::Eof, span: Span { start, end: start } });
        };

        let kind = match b {
            b'(' => self.punct(Punct::LParen),
            b')' => self.punct(Punct::RParen),
            b',' => self.punct(Punct::Comma),
            b';' => self.punct(Punct::Semicolon),
            b'<' => self.punct(Punct::LAngle),
            b'>' => self.punct(Punct::RAngle),
            b'=' => self.punct(Punct::Equals),
            b'0'..=b'9' => self.lex_number()?,
            b'+' | b'-' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.lex_number()?
            }
            b'`' => self.lex_quoted_identifier()?,
            b'a'..=b'z' | b'A'..=b'Z' => self.lex_word(),
            _ => {
                // src[start..] is non-empty and starts on a char boundary
                let ch = self.src[start..].chars().next().unwrap_or('\u{FFFD}');
                return Err(self.error(start, LexErrorKind::UnexpectedChar(ch)));
            }
        };

        Ok(Token { kind, span: Span { start, end: self.pos } })
    }

    fn punct(&mut self, p: Punct) -> TokenKind {
        self.pos += 1;
        TokenKind::Punct(p)
    }

    /// Whitespace plus `--`, `#` and `/* */` comments.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match (self.peek_at(0), self.peek_at(1)) {
                (Some(c), _) if c.is_ascii_whitespace() => self.pos += 1,
                (Some(b'-'), Some(b'-')) | (Some(b'#'), _) => {
                    while let Some(c) = self.peek_at(0) {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    let start = self.pos;
                    match self.src[self.pos + 2..].find("*/") {
                        Some(i) => self.pos += 2 + i + 2,
                        None => return Err(self.error(start, LexErrorKind::UnterminatedComment)),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let negative = match self.peek_at(0) {
            Some(b'-') => { self.pos += 1; true }
            Some(b'+') => { self.pos += 1; false }
            _ => false,
        };

        let is_hex = self.peek_at(0) == Some(b'0')
            && matches!(self.peek_at(1), Some(b'x' | b'X'))
            && self.peek_at(2).is_some_and(|c| c.is_ascii_hexdigit());

        let (digits_start, radix) = if is_hex {
            self.pos += 2;
            (self.pos, 16)
        } else {
            (self.pos, 10)
        };
        while self.peek_at(0).is_some_and(|c| (c as char).is_digit(radix)) {
            self.pos += 1;
        }
        // `12abc` or `0x1g` is one malformed literal, not two tokens.
        while self.peek_at(0).is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }

        let text = &self.src[start..self.pos];
        let invalid = || self.error(start, LexErrorKind::InvalidNumber(text.to_string()));
        let magnitude = i64::from_str_radix(&self.src[digits_start..self.pos], radix)
            .map_err(|_| invalid())?;
        let value = if negative { -magnitude } else { magnitude };

        Ok(if is_hex { TokenKind::Hex(value) } else { TokenKind::Decimal(value) })
    }

    fn lex_word(&mut self) -> TokenKind {
        let start = self.pos;
        while self.peek_at(0).is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_') {
            self.pos += 1;
        }
        let word = &self.src[start..self.pos];
        match Keyword::from_word(word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Identifier(word.to_string()),
        }
    }

    fn lex_quoted_identifier(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        let body = &self.src[start + 1..];
        let Some(end) = body.find(['`', '\n']).filter(|&i| body.as_bytes()[i] == b'`') else {
            return Err(self.error(start, LexErrorKind::UnterminatedQuotedIdentifier));
        };
        let name = &body[..end];
        if !is_valid_identifier(name) {
            return Err(self.error(start, LexErrorKind::InvalidQuotedIdentifier(name.to_string())));
        }
        self.pos = start + 1 + end + 1;
        Ok(TokenKind::Identifier(name.to_string()))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let item = self.next_token();
        self.done = !matches!(&item, Ok(tok) if tok.kind != TokenKind::Eof);
        Some(item)
    }
}

/// Tokenize the whole input, `Eof` included.
pub fn tokenize(src: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(src).collect()
}

// ------------------------------- Tests ------------------------------------ //
