//! Cursor-based SQL parser
//!
//! The parser is split into several modules:
//! - token_helper: the token cursor every sub-parser threads through
//! - expr_parser: expression parsing with operator precedence
//! - type_parser: column types and CAST targets
//! - dml_parser: SELECT, INSERT, UPDATE, DELETE and their shared clauses
//! - ddl_parser: CREATE/ALTER/DROP TABLE, TRUNCATE, SHOW

pub mod ddl_parser;
pub mod dml_parser;
pub mod expr_parser;
pub mod token_helper;
pub mod type_parser;

use self::expr_parser::parse_complete_expression;
use self::token_helper::Cursor;
use super::ast::{DmlStatement, Statement, VariableAssignment};
use super::token::TokenKind;
use super::tokenizer::tokenize;
use crate::error::{Error, Result};
use crate::types::context::normalize_variable;

/// The SQL parser turns SQL text into a statement AST.
///
/// The AST represents the syntactic structure of a statement (the SELECT
/// and FROM clauses, values, arithmetic expressions, etc.). It only ensures
/// the syntax is well-formed and does not know whether a given table or
/// column exists; that is checked when the statement runs.
pub struct Parser;

impl Parser {
    /// Parses the input string into a SQL statement AST. The entire string must
    /// be parsed as a single statement, ending with an optional semicolon.
    pub fn parse(sql: &str) -> Result<Statement> {
        let mut tokens = tokenize(sql)?;
        if tokens
            .last()
            .is_some_and(|t| t.kind == TokenKind::Separator && t.value == ";")
        {
            tokens.pop();
        }
        if tokens.is_empty() {
            return Err(Error::ParseError("empty statement".into()));
        }

        let cursor = Cursor::new(&tokens, sql);
        let (statement, rest) = Self::parse_statement(cursor)?;
        rest.expect_end()?;
        Ok(statement)
    }

    /// Parses one statement, dispatching on its leading keyword.
    pub fn parse_statement(cursor: Cursor<'_>) -> Result<(Statement, Cursor<'_>)> {
        let Some(token) = cursor.peek() else {
            return Err(Error::ParseError("unexpected end of input".into()));
        };

        if token.is_open_paren() || token.is("SELECT") {
            let (select, rest) = dml_parser::parse_select(cursor)?;
            return Ok((Statement::select(select), rest));
        }
        if token.kind != TokenKind::ClauseKeyword {
            return Err(cursor.error(format!("expected statement, found {}", token)));
        }

        match token.value.as_str() {
            "INSERT" => {
                let (insert, rest) = dml_parser::parse_insert(cursor)?;
                Ok((Statement::Dml(DmlStatement::Insert(insert)), rest))
            }
            "UPDATE" => {
                let (update, rest) = dml_parser::parse_update(cursor)?;
                Ok((Statement::Dml(DmlStatement::Update(update)), rest))
            }
            "DELETE" => {
                let (delete, rest) = dml_parser::parse_delete(cursor)?;
                Ok((Statement::Dml(DmlStatement::Delete(delete)), rest))
            }
            "CREATE" => {
                let (ddl, rest) = ddl_parser::parse_create_table(cursor)?;
                Ok((Statement::Ddl(ddl), rest))
            }
            "ALTER" => {
                let (ddl, rest) = ddl_parser::parse_alter_table(cursor)?;
                Ok((Statement::Ddl(ddl), rest))
            }
            "DROP" => {
                let (ddl, rest) = ddl_parser::parse_drop_table(cursor)?;
                Ok((Statement::Ddl(ddl), rest))
            }
            "TRUNCATE" => {
                let (ddl, rest) = ddl_parser::parse_truncate(cursor)?;
                Ok((Statement::Ddl(ddl), rest))
            }
            "SHOW" => {
                let (ddl, rest) = ddl_parser::parse_show(cursor)?;
                Ok((Statement::Ddl(ddl), rest))
            }
            "BEGIN" => Ok((Statement::Begin, skip_noise(cursor.advance(), &["WORK"]))),
            "START TRANSACTION" => Ok((
                Statement::Begin,
                skip_noise(cursor.advance(), &["READ", "WRITE", "ONLY"]),
            )),
            "COMMIT" => Ok((Statement::Commit, skip_noise(cursor.advance(), &["WORK"]))),
            "ROLLBACK" => Ok((Statement::Rollback, skip_noise(cursor.advance(), &["WORK"]))),
            "SET" => Self::parse_set(cursor),
            "USE" => {
                let (database, rest) = cursor.advance().next_name()?;
                Ok((Statement::Use(database), rest))
            }
            _ => Err(cursor.error(format!("unsupported statement {}", token.value))),
        }
    }

    /// `SET @a = expr [, @b := expr]`. Anything that is not a user variable
    /// (`NAMES utf8`, `SESSION sql_mode = ...`, `@@autocommit = 1`) is
    /// accepted and dropped.
    fn parse_set(cursor: Cursor<'_>) -> Result<(Statement, Cursor<'_>)> {
        let cursor = cursor.expect_keyword("SET")?;
        if cursor.is_at_end() {
            return Err(cursor.error("SET requires an assignment".to_string()));
        }

        let mut assignments = Vec::new();
        for (from, to) in cursor.split_top_level(cursor.position(), cursor.len()) {
            let part = cursor.slice(from, to);
            let Some(token) = part.peek() else {
                return Err(cursor.error("empty assignment in SET".to_string()));
            };
            if token.kind != TokenKind::Variable || token.value.starts_with("@@") {
                continue;
            }
            let next = part.advance();
            let next = next
                .next_if_symbol("=")
                .or_else(|| next.next_if_symbol(":="))
                .ok_or_else(|| next.error(format!("expected = after {}", token)))?;
            assignments.push(VariableAssignment {
                name: normalize_variable(&token.value),
                value: parse_complete_expression(next)?,
            });
        }

        Ok((Statement::Set(assignments), cursor.jump(cursor.len())))
    }
}

/// Skips optional trailing words such as `COMMIT WORK`
fn skip_noise<'a>(cursor: Cursor<'a>, words: &[&str]) -> Cursor<'a> {
    let mut cursor = cursor;
    while let Some(token) = cursor.peek() {
        if words.iter().any(|w| token.is(w)) || token.is_comma() {
            cursor = cursor.advance();
        } else {
            break;
        }
    }
    cursor
}
