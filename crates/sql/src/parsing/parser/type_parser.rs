//! Type parser module
//!
//! Handles column types in CREATE TABLE and the target types of CAST and
//! CONVERT. Type names are matched on the token's value, whatever kind the
//! tokenizer gave it (`DECIMAL(` is a function name, `SET(` a clause keyword).

use super::token_helper::Cursor;
use crate::error::{Error, Result};
use crate::parsing::ast::CastTarget;
use crate::parsing::token::{Token, TokenKind};
use crate::types::column::{CharacterKind, ChronoKind, ColumnType, IntegerSize, NumberKind};

/// Default DECIMAL precision and scale when the declaration omits them
const DEFAULT_DECIMAL: (u32, u32) = (10, 0);

/// Parses a column type with its length/precision arguments and numeric
/// modifiers.
pub fn parse_column_type(cursor: Cursor<'_>) -> Result<(ColumnType, Cursor<'_>)> {
    let (token, next) = cursor.next()?;
    let word = type_word(token, &cursor)?;
    let (args, mut next) = parse_type_args(next)?;

    let data_type = match word.as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "INTEGER" | "BIGINT" => {
            let size = match word.as_str() {
                "TINYINT" => IntegerSize::Tiny,
                "SMALLINT" => IntegerSize::Small,
                "MEDIUMINT" => IntegerSize::Medium,
                "BIGINT" => IntegerSize::Big,
                _ => IntegerSize::Int,
            };
            ColumnType::Integer {
                size,
                unsigned: false,
                display_width: numeric_arg(&args, 0)?,
                auto_increment: false,
            }
        }
        "BOOL" | "BOOLEAN" => ColumnType::Integer {
            size: IntegerSize::Tiny,
            unsigned: false,
            display_width: Some(1),
            auto_increment: false,
        },
        "DECIMAL" | "NUMERIC" | "DEC" | "FIXED" => {
            let precision = numeric_arg(&args, 0)?.unwrap_or(DEFAULT_DECIMAL.0);
            let scale = numeric_arg(&args, 1)?.unwrap_or(DEFAULT_DECIMAL.1);
            if scale > precision {
                return Err(Error::ParseError(format!(
                    "scale {} cannot exceed precision {}",
                    scale, precision
                )));
            }
            ColumnType::decimal(precision, scale)
        }
        "FLOAT" => ColumnType::Number {
            kind: NumberKind::Float,
            unsigned: false,
        },
        "DOUBLE" | "REAL" => {
            next = next.next_if_keyword("PRECISION").unwrap_or(next);
            ColumnType::double()
        }
        "CHAR" | "CHARACTER" | "NCHAR" => character(CharacterKind::Char, &args)?,
        "VARCHAR" | "NVARCHAR" => {
            if args.is_empty() {
                return Err(Error::ParseError("VARCHAR requires a length".into()));
            }
            character(CharacterKind::Varchar, &args)?
        }
        "BINARY" => character(CharacterKind::Binary, &args)?,
        "VARBINARY" => character(CharacterKind::Varbinary, &args)?,
        "TINYTEXT" => character(CharacterKind::TinyText, &[])?,
        "TEXT" => character(CharacterKind::Text, &[])?,
        "MEDIUMTEXT" => character(CharacterKind::MediumText, &[])?,
        "LONGTEXT" => character(CharacterKind::LongText, &[])?,
        "TINYBLOB" => character(CharacterKind::TinyBlob, &[])?,
        "BLOB" => character(CharacterKind::Blob, &[])?,
        "MEDIUMBLOB" => character(CharacterKind::MediumBlob, &[])?,
        "LONGBLOB" => character(CharacterKind::LongBlob, &[])?,
        "JSON" => character(CharacterKind::Json, &[])?,
        "DATE" => ColumnType::chronological(ChronoKind::Date),
        "DATETIME" => ColumnType::chronological(ChronoKind::DateTime),
        "TIMESTAMP" => ColumnType::chronological(ChronoKind::Timestamp),
        "TIME" => ColumnType::chronological(ChronoKind::Time),
        "YEAR" => ColumnType::chronological(ChronoKind::Year),
        "ENUM" => ColumnType::Enum { values: args },
        "SET" => ColumnType::Set { values: args },
        other => {
            return Err(cursor.error(format!("unknown column type {}", other)));
        }
    };

    let (data_type, next) = parse_numeric_modifiers(data_type, next);
    Ok((data_type, next))
}

/// Consumes UNSIGNED / SIGNED / ZEROFILL after a numeric type
fn parse_numeric_modifiers(mut data_type: ColumnType, cursor: Cursor<'_>) -> (ColumnType, Cursor<'_>) {
    let mut cursor = cursor;
    loop {
        if let Some(next) = cursor.next_if_keyword("UNSIGNED") {
            match &mut data_type {
                ColumnType::Integer { unsigned, .. } | ColumnType::Number { unsigned, .. } => {
                    *unsigned = true
                }
                _ => {}
            }
            cursor = next;
        } else if let Some(next) = cursor
            .next_if_keyword("SIGNED")
            .or_else(|| cursor.next_if_keyword("ZEROFILL"))
        {
            cursor = next;
        } else {
            return (data_type, cursor);
        }
    }
}

/// Parses the target of `CAST(x AS target)`.
pub fn parse_cast_target(cursor: Cursor<'_>) -> Result<(CastTarget, Cursor<'_>)> {
    let (token, next) = cursor.next()?;
    let word = type_word(token, &cursor)?;
    let (args, next) = parse_type_args(next)?;

    let target = match word.as_str() {
        "SIGNED" | "INT" | "INTEGER" => CastTarget::Signed,
        "UNSIGNED" => CastTarget::Unsigned,
        "CHAR" | "NCHAR" | "VARCHAR" | "JSON" => CastTarget::Char(numeric_arg(&args, 0)?),
        "DECIMAL" | "NUMERIC" | "DEC" => CastTarget::Decimal {
            precision: numeric_arg(&args, 0)?.unwrap_or(DEFAULT_DECIMAL.0),
            scale: numeric_arg(&args, 1)?.unwrap_or(DEFAULT_DECIMAL.1),
        },
        "DOUBLE" | "FLOAT" | "REAL" => CastTarget::Double,
        "DATE" => CastTarget::Date,
        "DATETIME" | "TIMESTAMP" => CastTarget::DateTime,
        "TIME" => CastTarget::Time,
        "BINARY" => CastTarget::Binary,
        other => return Err(cursor.error(format!("unsupported cast target {}", other))),
    };

    // SIGNED INTEGER, UNSIGNED INT
    let next = match target {
        CastTarget::Signed | CastTarget::Unsigned => next
            .next_if_keyword("INTEGER")
            .or_else(|| next.next_if_keyword("INT"))
            .unwrap_or(next),
        _ => next,
    };
    Ok((target, next))
}

/// The upper-cased type name carried by a token
fn type_word(token: &Token, cursor: &Cursor<'_>) -> Result<String> {
    if token.is_bare_word() {
        Ok(token.value.to_ascii_uppercase())
    } else {
        Err(cursor.error(format!("expected type name, found {}", token)))
    }
}

/// Parses an optional `(arg, ...)` list of numbers or string literals
fn parse_type_args(cursor: Cursor<'_>) -> Result<(Vec<String>, Cursor<'_>)> {
    if !cursor.peek().is_some_and(Token::is_open_paren) {
        return Ok((Vec::new(), cursor));
    }
    let mut args = Vec::new();
    let mut cursor = cursor.advance();
    loop {
        let (token, next) = cursor.next()?;
        match token.kind {
            TokenKind::NumericConstant | TokenKind::StringConstant => args.push(token.value.clone()),
            _ => return Err(cursor.error(format!("expected type argument, found {}", token))),
        }
        if let Some(after) = next.next_if_comma() {
            cursor = after;
            continue;
        }
        return Ok((args, next.expect_close_paren()?));
    }
}

fn numeric_arg(args: &[String], index: usize) -> Result<Option<u32>> {
    args.get(index)
        .map(|arg| {
            arg.parse::<u32>()
                .map_err(|_| Error::ParseError(format!("invalid type length {}", arg)))
        })
        .transpose()
}

fn character(kind: CharacterKind, args: &[String]) -> Result<ColumnType> {
    let length = numeric_arg(args, 0)?.map(u64::from);
    Ok(ColumnType::character(kind, length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tokenizer::tokenize;

    fn column_type(sql: &str) -> ColumnType {
        let tokens = tokenize(sql).unwrap();
        let (data_type, rest) = parse_column_type(Cursor::new(&tokens, sql)).unwrap();
        rest.expect_end().unwrap();
        data_type
    }

    #[test]
    fn test_integer_types() {
        assert_eq!(
            column_type("int(11) unsigned"),
            ColumnType::Integer {
                size: IntegerSize::Int,
                unsigned: true,
                display_width: Some(11),
                auto_increment: false,
            }
        );
        assert!(matches!(
            column_type("BIGINT"),
            ColumnType::Integer {
                size: IntegerSize::Big,
                ..
            }
        ));
        assert!(matches!(
            column_type("tinyint(1)"),
            ColumnType::Integer {
                size: IntegerSize::Tiny,
                ..
            }
        ));
    }

    #[test]
    fn test_character_types() {
        assert_eq!(column_type("VARCHAR(255)"), ColumnType::varchar(255));
        assert_eq!(column_type("char"), ColumnType::character(CharacterKind::Char, Some(1)));
        assert_eq!(column_type("text").max_length(), Some(65_535));
    }

    #[test]
    fn test_decimal_and_enum() {
        assert_eq!(column_type("decimal(10,2)"), ColumnType::decimal(10, 2));
        assert_eq!(column_type("DECIMAL"), ColumnType::decimal(10, 0));
        assert_eq!(
            column_type("ENUM('a', 'b')"),
            ColumnType::Enum {
                values: vec!["a".into(), "b".into()]
            }
        );
        assert_eq!(
            column_type("set('x')"),
            ColumnType::Set {
                values: vec!["x".into()]
            }
        );
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let sql = "WIDGET";
        let tokens = tokenize(sql).unwrap();
        assert!(parse_column_type(Cursor::new(&tokens, sql)).is_err());
    }

    #[test]
    fn test_cast_targets() {
        let sql = "UNSIGNED INTEGER";
        let tokens = tokenize(sql).unwrap();
        let (target, rest) = parse_cast_target(Cursor::new(&tokens, sql)).unwrap();
        assert_eq!(target, CastTarget::Unsigned);
        assert!(rest.is_at_end());

        let sql = "CHAR(3)";
        let tokens = tokenize(sql).unwrap();
        let (target, _) = parse_cast_target(Cursor::new(&tokens, sql)).unwrap();
        assert_eq!(target, CastTarget::Char(Some(3)));
    }
}
