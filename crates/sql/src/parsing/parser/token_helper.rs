//! Token cursor
//!
//! Every sub-parser takes a `Cursor` by value and hands back the cursor
//! positioned after what it consumed, alongside the AST fragment it built.
//! Cursors are `Copy`, so backtracking is just keeping the old one.

use crate::error::{Error, Result};
use crate::parsing::token::{Token, TokenKind};

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    sql: &'a str,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token], sql: &'a str) -> Self {
        Self { tokens, pos: 0, sql }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peeks the current token without consuming it.
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Peeks `n` tokens past the current one.
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    /// Whether the current token is the keyword `word`
    pub fn peek_is(&self, word: &str) -> bool {
        self.peek().is_some_and(|t| t.is(word))
    }

    pub fn advance(self) -> Self {
        self.jump(self.pos + 1)
    }

    pub fn jump(self, pos: usize) -> Self {
        Self { pos, ..self }
    }

    /// Fetches the current token, or errors at end of input.
    pub fn next(self) -> Result<(&'a Token, Self)> {
        match self.peek() {
            Some(token) => Ok((token, self.advance())),
            None => Err(Error::ParseError("unexpected end of input".into())),
        }
    }

    /// Consumes the current token if it satisfies the predicate.
    pub fn next_if(self, predicate: impl Fn(&Token) -> bool) -> Option<(&'a Token, Self)> {
        self.peek()
            .filter(|token| predicate(token))
            .map(|token| (token, self.advance()))
    }

    /// Consumes the keyword `word` if it is next.
    pub fn next_if_keyword(self, word: &str) -> Option<Self> {
        self.next_if(|t| t.is(word)).map(|(_, cursor)| cursor)
    }

    /// Consumes the keyword `word`, or errors.
    pub fn expect_keyword(self, word: &str) -> Result<Self> {
        match self.peek() {
            Some(token) if token.is(word) => Ok(self.advance()),
            Some(token) => Err(self.error(format!("expected {}, found {}", word, token))),
            None => Err(Error::ParseError(format!(
                "expected {}, found end of input",
                word
            ))),
        }
    }

    /// Consumes the operator symbol `symbol` (`=`, `:=`...) if it is next.
    pub fn next_if_symbol(self, symbol: &str) -> Option<Self> {
        self.next_if(|t| t.kind == TokenKind::Operator && t.value == symbol)
            .map(|(_, cursor)| cursor)
    }

    pub fn expect_symbol(self, symbol: &str) -> Result<Self> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Operator && token.value == symbol => {
                Ok(self.advance())
            }
            Some(token) => Err(self.error(format!("expected {}, found {}", symbol, token))),
            None => Err(Error::ParseError(format!(
                "expected {}, found end of input",
                symbol
            ))),
        }
    }

    pub fn next_if_open_paren(self) -> Option<Self> {
        self.next_if(Token::is_open_paren).map(|(_, c)| c)
    }

    pub fn next_if_comma(self) -> Option<Self> {
        self.next_if(Token::is_comma).map(|(_, c)| c)
    }

    pub fn expect_open_paren(self) -> Result<Self> {
        match self.peek() {
            Some(token) if token.is_open_paren() => Ok(self.advance()),
            Some(token) => Err(self.error(format!("expected (, found {}", token))),
            None => Err(Error::ParseError("expected (, found end of input".into())),
        }
    }

    pub fn expect_close_paren(self) -> Result<Self> {
        match self.peek() {
            Some(token) if token.is_close_paren() => Ok(self.advance()),
            Some(token) => Err(self.error(format!("expected ), found {}", token))),
            None => Err(Error::ParseError("expected ), found end of input".into())),
        }
    }

    /// Returns the next name: an identifier, or any bare word used as one
    /// (`users(` tokenizes as a function name, `status` as an identifier).
    pub fn next_name(self) -> Result<(String, Self)> {
        let (token, cursor) = self.next()?;
        match token.kind {
            TokenKind::Identifier if token.value != "*" => Ok((token.value.clone(), cursor)),
            TokenKind::FunctionName => Ok((token.raw.clone(), cursor)),
            TokenKind::StringConstant => Ok((token.value.clone(), cursor)),
            _ => Err(self.error(format!("expected identifier, found {}", token))),
        }
    }

    /// Like `next_name`, but also accepts keywords (`KEY`, `INDEX`...) as
    /// names where the grammar cannot confuse them.
    pub fn next_name_or_keyword(self) -> Result<(String, Self)> {
        let (token, cursor) = self.next()?;
        if token.is_bare_word() || token.kind == TokenKind::Identifier {
            let name = if token.kind == TokenKind::Identifier {
                token.value.clone()
            } else {
                token.raw.clone()
            };
            return Ok((name, cursor));
        }
        self.next_name()
    }

    /// Index of the `)` matching the `(` at the current position
    pub fn matching_paren(&self) -> Result<usize> {
        let mut depth = 0usize;
        for (i, token) in self.tokens.iter().enumerate().skip(self.pos) {
            if token.is_open_paren() {
                depth += 1;
            } else if token.is_close_paren() {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| self.error("unbalanced parenthesis".to_string()))?;
                if depth == 0 {
                    return Ok(i);
                }
            }
        }
        Err(self.error("unbalanced parenthesis".to_string()))
    }

    /// A cursor over `tokens[start..end]` of this cursor's slice
    pub fn slice(&self, start: usize, end: usize) -> Cursor<'a> {
        Cursor::new(&self.tokens[start..end], self.sql)
    }

    /// Ranges between top-level commas of `tokens[start..end]`
    pub fn split_top_level(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut parts = Vec::new();
        let mut depth = 0i32;
        let mut part_start = start;
        for i in start..end {
            let token = &self.tokens[i];
            if token.is_open_paren() {
                depth += 1;
            } else if token.is_close_paren() {
                depth -= 1;
            } else if depth == 0 && token.is_comma() {
                parts.push((part_start, i));
                part_start = i + 1;
            }
        }
        if part_start < end || !parts.is_empty() {
            parts.push((part_start, end));
        }
        parts
    }

    /// Source text covering `tokens[start..end]`
    pub fn span(&self, start: usize, end: usize) -> String {
        if start >= end || end > self.tokens.len() {
            return String::new();
        }
        let from = self.tokens[start].offset;
        let to = self.tokens[end - 1].end();
        self.sql.get(from..to).unwrap_or_default().to_string()
    }

    /// Parse error pointing at the current token
    pub fn error(&self, message: String) -> Error {
        match self.peek() {
            Some(token) => Error::ParseError(format!("{} near '{}' at offset {}", message, token, token.offset)),
            None => Error::ParseError(format!("{} at end of input", message)),
        }
    }

    /// Fails unless every token has been consumed
    pub fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("unexpected token {}", token))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tokenizer::tokenize;

    #[test]
    fn test_matching_paren_and_span() {
        let sql = "f(a, (b + c)), d";
        let tokens = tokenize(sql).unwrap();
        let cursor = Cursor::new(&tokens, sql).advance();
        let close = cursor.matching_paren().unwrap();
        assert_eq!(close, 9);
        assert_eq!(cursor.span(0, close + 1), "f(a, (b + c))");
    }

    #[test]
    fn test_split_top_level_ignores_nested_commas() {
        let sql = "a, f(b, c), d";
        let tokens = tokenize(sql).unwrap();
        let cursor = Cursor::new(&tokens, sql);
        let parts = cursor.split_top_level(0, tokens.len());
        assert_eq!(parts.len(), 3);
        assert_eq!(cursor.span(parts[1].0, parts[1].1), "f(b, c)");
    }

    #[test]
    fn test_unbalanced_paren() {
        let sql = "(a";
        let tokens = tokenize(sql).unwrap();
        assert!(Cursor::new(&tokens, sql).matching_paren().is_err());
    }

    #[test]
    fn test_cursor_is_a_value() {
        let sql = "SELECT 1";
        let tokens = tokenize(sql).unwrap();
        let start = Cursor::new(&tokens, sql);
        let after = start.expect_keyword("SELECT").unwrap();
        assert_eq!(start.position(), 0);
        assert_eq!(after.position(), 1);
    }
}
