//! SQL lexer
//!
//! Splits raw SQL text into lexemes: words, numbers, quoted spans, operators
//! and punctuation, each with its byte offset. Whitespace and comments are
//! dropped here so the tokenizer never sees them. Quoted spans keep their
//! quotes; a quoted span directly followed by `.` keeps going so that
//! `` `db`.`table` `` arrives as a single lexeme.

use crate::error::{Error, Result};

/// A slice of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexeme<'a> {
    pub text: &'a str,
    pub offset: usize,
}

/// Operators made of more than one character, longest first
const MULTI_CHAR_OPERATORS: &[&str] = &["<=>", "<<", ">>", "<=", ">=", "<>", "!=", ":=", "||", "&&"];

const SINGLE_CHAR_DELIMITERS: &[u8] = b"=<>!~^*/%+-&|(),;?";

/// Split SQL text into lexemes
pub fn lex(sql: &str) -> Result<Vec<Lexeme<'_>>> {
    let mut lexer = Lexer {
        sql,
        bytes: sql.as_bytes(),
        pos: 0,
        lexemes: Vec::new(),
    };
    lexer.run()?;
    Ok(lexer.lexemes)
}

struct Lexer<'a> {
    sql: &'a str,
    bytes: &'a [u8],
    pos: usize,
    lexemes: Vec<Lexeme<'a>>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) -> Result<()> {
        while let Some(byte) = self.peek(0) {
            match byte {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'#' => self.skip_line_comment(),
                b'-' if self.peek(1) == Some(b'-')
                    && self.peek(2).map_or(true, |b| b.is_ascii_whitespace()) =>
                {
                    self.skip_line_comment()
                }
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment()?,
                b'\'' | b'"' | b'`' => {
                    let start = self.pos;
                    self.scan_quoted()?;
                    self.scan_continuation()?;
                    self.emit(start);
                }
                b':' if self.peek(1).is_some_and(is_word_byte) => {
                    let start = self.pos;
                    self.pos += 1;
                    self.scan_word();
                    self.emit(start);
                }
                b if is_word_byte(b) || (b == b'.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) => {
                    let start = self.pos;
                    self.scan_word();
                    self.scan_continuation()?;
                    self.emit(start);
                }
                _ => self.scan_operator()?,
            }
        }
        Ok(())
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn emit(&mut self, start: usize) {
        self.lexemes.push(Lexeme {
            text: &self.sql[start..self.pos],
            offset: start,
        });
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.peek(0) == Some(b'*') && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(Error::ParseError(format!(
            "Unterminated comment starting at offset {}",
            start
        )))
    }

    /// Consume a quoted span including both quotes
    fn scan_quoted(&mut self) -> Result<()> {
        let start = self.pos;
        let quote = self.bytes[self.pos];
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            if b == b'\\' && quote != b'`' {
                self.pos += 2;
                continue;
            }
            if b == quote {
                if self.peek(1) == Some(quote) {
                    self.pos += 2;
                    continue;
                }
                self.pos += 1;
                return Ok(());
            }
            self.pos += 1;
        }
        Err(Error::ParseError(format!(
            "Unbalanced quote {} starting at offset {}",
            quote as char, start
        )))
    }

    /// Words and numbers, including `.`-qualified names and exponents
    fn scan_word(&mut self) {
        let numeric = self
            .peek(0)
            .is_some_and(|b| b.is_ascii_digit() || b == b'.');
        while let Some(b) = self.peek(0) {
            if is_word_byte(b) || b == b'.' {
                self.pos += 1;
                if numeric
                    && (b == b'e' || b == b'E')
                    && matches!(self.peek(0), Some(b'+' | b'-'))
                    && self.peek(1).is_some_and(|d| d.is_ascii_digit())
                {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// After `name.` or `` `name`. `` keep absorbing the next qualified part
    fn scan_continuation(&mut self) -> Result<()> {
        loop {
            let ends_with_dot = self.pos > 0 && self.bytes[self.pos - 1] == b'.';
            if !ends_with_dot {
                if self.peek(0) == Some(b'.') && self.bytes[self.pos - 1] == b'`' {
                    self.pos += 1;
                    continue;
                }
                return Ok(());
            }
            match self.peek(0) {
                Some(b'`') => self.scan_quoted()?,
                Some(b'*') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b) if is_word_byte(b) => self.scan_word(),
                _ => return Ok(()),
            }
        }
    }

    fn scan_operator(&mut self) -> Result<()> {
        let rest = &self.sql[self.pos..];
        if let Some(op) = MULTI_CHAR_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            let start = self.pos;
            self.pos += op.len();
            self.emit(start);
            return Ok(());
        }
        let byte = self.bytes[self.pos];
        if SINGLE_CHAR_DELIMITERS.contains(&byte) {
            let start = self.pos;
            self.pos += 1;
            self.emit(start);
            return Ok(());
        }
        let ch = rest.chars().next().unwrap_or('?');
        Err(Error::ParseError(format!(
            "Unexpected character '{}' at offset {}",
            ch, self.pos
        )))
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'@' || b >= 0x80
}
