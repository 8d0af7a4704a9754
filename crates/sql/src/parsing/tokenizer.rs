//! Tokenizer: classifies lexemes into typed tokens

use super::lexer::{lex, Lexeme};
use super::token::{Token, TokenKind};
use crate::error::{Error, Result};
use shadow_value::is_numeric_str;

/// Keywords that open or separate statement clauses
const CLAUSE_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "HAVING", "LIMIT", "OFFSET", "UNION", "INTERSECT", "EXCEPT",
    "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE", "CREATE", "ALTER", "DROP",
    "TRUNCATE", "SHOW", "BEGIN", "COMMIT", "ROLLBACK", "USE",
];

/// Words that act as operators inside expressions
const OPERATOR_WORDS: &[&str] = &[
    "AND", "OR", "XOR", "NOT", "IS", "LIKE", "RLIKE", "REGEXP", "IN", "BETWEEN", "EXISTS", "DIV",
    "MOD", "INTERVAL", "BINARY", "COLLATE", "CASE", "WHEN", "THEN", "ELSE", "END",
];

const RESERVED_WORDS: &[&str] = &[
    "AS", "DISTINCT", "ALL", "ASC", "DESC", "ON", "USING", "JOIN", "STRAIGHT_JOIN", "DEFAULT",
    "IGNORE", "TABLE", "INDEX", "KEY", "PRIMARY", "UNIQUE", "FULLTEXT", "SEPARATOR",
    "CONSTRAINT", "FOREIGN", "REFERENCES",
];

/// Multi-word keywords recognised by lookahead. Longer phrases sharing a
/// prefix are listed first so the longest match wins.
const PHRASES: &[(&[&str], TokenKind)] = &[
    (&["ON", "DUPLICATE", "KEY", "UPDATE"], TokenKind::ClauseKeyword),
    (&["LOCK", "IN", "SHARE", "MODE"], TokenKind::ClauseKeyword),
    (&["DEFAULT", "CHARACTER", "SET"], TokenKind::ReservedWord),
    (&["LEFT", "OUTER", "JOIN"], TokenKind::ReservedWord),
    (&["RIGHT", "OUTER", "JOIN"], TokenKind::ReservedWord),
    (&["FOR", "ORDER", "BY"], TokenKind::ReservedWord),
    (&["FOR", "GROUP", "BY"], TokenKind::ReservedWord),
    (&["IF", "NOT", "EXISTS"], TokenKind::ReservedWord),
    (&["ORDER", "BY"], TokenKind::ClauseKeyword),
    (&["GROUP", "BY"], TokenKind::ClauseKeyword),
    (&["UNION", "ALL"], TokenKind::ClauseKeyword),
    (&["UNION", "DISTINCT"], TokenKind::ClauseKeyword),
    (&["FOR", "UPDATE"], TokenKind::ClauseKeyword),
    (&["START", "TRANSACTION"], TokenKind::ClauseKeyword),
    (&["INNER", "JOIN"], TokenKind::ReservedWord),
    (&["CROSS", "JOIN"], TokenKind::ReservedWord),
    (&["LEFT", "JOIN"], TokenKind::ReservedWord),
    (&["RIGHT", "JOIN"], TokenKind::ReservedWord),
    (&["NATURAL", "JOIN"], TokenKind::ReservedWord),
    (&["USE", "INDEX"], TokenKind::ReservedWord),
    (&["USE", "KEY"], TokenKind::ReservedWord),
    (&["IGNORE", "INDEX"], TokenKind::ReservedWord),
    (&["IGNORE", "KEY"], TokenKind::ReservedWord),
    (&["FORCE", "INDEX"], TokenKind::ReservedWord),
    (&["FORCE", "KEY"], TokenKind::ReservedWord),
    (&["FOR", "JOIN"], TokenKind::ReservedWord),
    (&["PRIMARY", "KEY"], TokenKind::ReservedWord),
    (&["UNIQUE", "KEY"], TokenKind::ReservedWord),
    (&["UNIQUE", "INDEX"], TokenKind::ReservedWord),
    (&["FULLTEXT", "KEY"], TokenKind::ReservedWord),
    (&["FULLTEXT", "INDEX"], TokenKind::ReservedWord),
    (&["FOREIGN", "KEY"], TokenKind::ReservedWord),
    (&["IF", "EXISTS"], TokenKind::ReservedWord),
    (&["CHARACTER", "SET"], TokenKind::ReservedWord),
    (&["DEFAULT", "CHARSET"], TokenKind::ReservedWord),
    (&["DEFAULT", "COLLATE"], TokenKind::ReservedWord),
    (&["ON", "UPDATE"], TokenKind::ReservedWord),
    (&["NOT", "NULL"], TokenKind::ReservedWord),
];

/// Turn SQL text into a token stream
pub fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let lexemes = lex(sql)?;
    let mut tokens: Vec<Token> = Vec::with_capacity(lexemes.len());
    let mut ordinal = 0;
    let mut i = 0;

    while i < lexemes.len() {
        if let Some((words, kind)) = match_phrase(&lexemes[i..], tokens.last()) {
            let first = lexemes[i];
            let last = lexemes[i + words.len() - 1];
            let raw = &sql[first.offset..last.offset + last.text.len()];
            tokens.push(Token::new(kind, words.join(" "), raw, first.offset));
            i += words.len();
            continue;
        }

        let token = classify(lexemes[i], tokens.last(), lexemes.get(i + 1), &mut ordinal)?;
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

fn match_phrase(
    lexemes: &[Lexeme<'_>],
    previous: Option<&Token>,
) -> Option<(&'static [&'static str], TokenKind)> {
    PHRASES
        .iter()
        .find(|(words, _)| {
            words.len() <= lexemes.len()
                && words
                    .iter()
                    .zip(lexemes)
                    .all(|(word, lexeme)| lexeme.text.eq_ignore_ascii_case(word))
        })
        .filter(|(words, _)| {
            // `x IS NOT NULL` is an expression, `col INT NOT NULL` a column attribute
            words[0] != "NOT" || !previous.is_some_and(|p| p.is("IS"))
        })
        .map(|(words, kind)| (*words, *kind))
}

fn classify(
    lexeme: Lexeme<'_>,
    previous: Option<&Token>,
    next: Option<&Lexeme<'_>>,
    ordinal: &mut usize,
) -> Result<Token> {
    let text = lexeme.text;
    let offset = lexeme.offset;
    let has_left_operand = previous.is_some_and(Token::ends_operand);
    let first = text.as_bytes()[0];

    let token = match first {
        b'\'' | b'"' => Token::new(TokenKind::StringConstant, unescape_string(text), text, offset),
        b'`' => Token::new(TokenKind::Identifier, normalize_identifier(text)?, text, offset),
        b'(' | b')' => Token::new(TokenKind::Paren, text, text, offset),
        b',' | b';' => Token::new(TokenKind::Separator, text, text, offset),
        b'?' => {
            *ordinal += 1;
            let mut token = Token::new(TokenKind::Placeholder, "?", text, offset);
            token.parameter_ordinal = Some(*ordinal);
            token
        }
        b':' if text.len() > 1 && text != ":=" => {
            let mut token = Token::new(TokenKind::Placeholder, text, text, offset);
            token.parameter_name = Some(text[1..].to_string());
            token
        }
        b'@' => Token::new(TokenKind::Variable, text, text, offset),
        b'*' if text.len() == 1 => {
            if has_left_operand {
                Token::new(TokenKind::Operator, "*", text, offset)
            } else {
                Token::new(TokenKind::Identifier, "*", text, offset)
            }
        }
        b'+' | b'-' if text.len() == 1 => {
            let value = match (has_left_operand, first) {
                (true, _) => text,
                (false, b'+') => "UNARY_PLUS",
                (false, _) => "UNARY_MINUS",
            };
            Token::new(TokenKind::Operator, value, text, offset)
        }
        b if b.is_ascii_digit() || b == b'.' => {
            if is_numeric_str(text) {
                Token::new(TokenKind::NumericConstant, text, text, offset)
            } else {
                Token::new(TokenKind::Identifier, normalize_identifier(text)?, text, offset)
            }
        }
        b if b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80 => {
            classify_word(text, offset, next)?
        }
        _ => Token::new(TokenKind::Operator, text, text, offset),
    };

    Ok(token)
}

fn classify_word(text: &str, offset: usize, next: Option<&Lexeme<'_>>) -> Result<Token> {
    if text.contains('.') || text.contains('`') {
        return Ok(Token::new(TokenKind::Identifier, normalize_identifier(text)?, text, offset));
    }

    let upper = text.to_ascii_uppercase();
    let followed_by_paren = next.is_some_and(|n| n.text == "(");

    let token = match upper.as_str() {
        "NULL" => Token::new(TokenKind::NullConstant, "NULL", text, offset),
        "TRUE" => Token::new(TokenKind::NumericConstant, "1", text, offset),
        "FALSE" => Token::new(TokenKind::NumericConstant, "0", text, offset),
        "MOD" if followed_by_paren => Token::new(TokenKind::FunctionName, upper, text, offset),
        w if CLAUSE_KEYWORDS.contains(&w) => Token::new(TokenKind::ClauseKeyword, upper, text, offset),
        w if OPERATOR_WORDS.contains(&w) => Token::new(TokenKind::Operator, upper, text, offset),
        w if RESERVED_WORDS.contains(&w) => Token::new(TokenKind::ReservedWord, upper, text, offset),
        _ if followed_by_paren => Token::new(TokenKind::FunctionName, upper, text, offset),
        _ => Token::new(TokenKind::Identifier, text, text, offset),
    };

    Ok(token)
}

/// Strip quotes from a string literal and resolve the escapes MySQL
/// resolves. Unknown escapes such as `\%`, `\_` and `\Z` keep their
/// backslash so LIKE patterns can still see them.
fn unescape_string(text: &str) -> String {
    let quote = text.chars().next().unwrap_or('\'');
    let inner = &text[1..text.len().saturating_sub(1).max(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('0') => out.push('\0'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else if c == quote && chars.peek() == Some(&quote) {
            chars.next();
            out.push(quote);
        } else {
            out.push(c);
        }
    }

    out
}

/// Remove backticks from each `.`-separated part of a name
fn normalize_identifier(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '`' if quoted && chars.peek() == Some(&'`') => {
                chars.next();
                out.push('`');
            }
            '`' => quoted = !quoted,
            _ => out.push(c),
        }
    }

    if quoted {
        return Err(Error::ParseError(format!("Unbalanced identifier quote in {}", text)));
    }
    Ok(out)
}
