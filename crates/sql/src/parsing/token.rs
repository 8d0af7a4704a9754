//! Typed tokens produced by the tokenizer

use std::fmt;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    NumericConstant,
    StringConstant,
    NullConstant,
    Identifier,
    ClauseKeyword,
    Operator,
    ReservedWord,
    Paren,
    Separator,
    FunctionName,
    Placeholder,
    Variable,
}

/// A classified lexeme.
///
/// `value` is normalized (keywords upper-cased, strings unescaped, quotes
/// stripped) while `raw` keeps the source text so expression names can echo
/// what the user wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub raw: String,
    pub offset: usize,
    pub parameter_name: Option<String>,
    pub parameter_ordinal: Option<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, raw: &str, offset: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            raw: raw.to_string(),
            offset,
            parameter_name: None,
            parameter_ordinal: None,
        }
    }

    /// Byte offset one past the end of the token in the source text
    pub fn end(&self) -> usize {
        self.offset + self.raw.len()
    }

    /// Whether the token is an unquoted word, whatever it was classified as.
    ///
    /// Quoted tokens never qualify so `` `select` `` stays an identifier.
    pub fn is_bare_word(&self) -> bool {
        match self.kind {
            TokenKind::ClauseKeyword
            | TokenKind::ReservedWord
            | TokenKind::Operator
            | TokenKind::FunctionName
            | TokenKind::NullConstant => true,
            TokenKind::Identifier => !self.raw.starts_with('`'),
            _ => false,
        }
    }

    /// True when the token is the keyword `word` (upper case)
    pub fn is(&self, word: &str) -> bool {
        self.is_bare_word() && self.value.eq_ignore_ascii_case(word)
    }

    pub fn is_open_paren(&self) -> bool {
        self.kind == TokenKind::Paren && self.value == "("
    }

    pub fn is_close_paren(&self) -> bool {
        self.kind == TokenKind::Paren && self.value == ")"
    }

    pub fn is_comma(&self) -> bool {
        self.kind == TokenKind::Separator && self.value == ","
    }

    /// Whether this token can end an operand, so that a following `+`, `-`
    /// or `*` is binary
    pub fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::NumericConstant
            | TokenKind::StringConstant
            | TokenKind::NullConstant
            | TokenKind::Identifier
            | TokenKind::Placeholder
            | TokenKind::Variable => true,
            TokenKind::Paren => self.value == ")",
            TokenKind::Operator => self.value == "END",
            _ => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
