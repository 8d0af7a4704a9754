//! SQL parser module
//!
//! Raw SQL goes through three stages: the lexer splits it into lexemes
//! (quotes, comments and escapes resolved), the tokenizer classifies each
//! lexeme, and the cursor-based parser builds the statement AST.

pub mod ast;
pub mod caching_parser;
mod lexer;
pub mod parser;
pub mod token;
mod tokenizer;

use crate::error::Result;

pub use ast::Statement;
pub use caching_parser::CachingParser;
pub use parser::Parser;
pub use token::{Token, TokenKind};
pub use tokenizer::tokenize;

/// Parse a SQL statement string into an AST
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::parse(sql)
}
