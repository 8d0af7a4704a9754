//! DDL (Data Definition Language) statement parser module
//!
//! Handles CREATE TABLE, ALTER TABLE ... AUTO_INCREMENT, DROP TABLE,
//! TRUNCATE and SHOW. CREATE TABLE resolves straight into a
//! `TableDefinition`.

use super::expr_parser::parse_expression;
use super::token_helper::Cursor;
use super::type_parser::parse_column_type;
use crate::error::{Error, Result};
use crate::parsing::ast::{DdlStatement, ExprKind, ObjectName};
use crate::parsing::token::{Token, TokenKind};
use crate::types::column::{Column, ColumnDefault, ColumnType};
use crate::types::schema::{Index, IndexKind, TableDefinition, PRIMARY_KEY_NAME};
use shadow_value::Value;

/// Functions accepted as `DEFAULT CURRENT_TIMESTAMP` spellings
const TIMESTAMP_DEFAULTS: &[&str] = &["CURRENT_TIMESTAMP", "NOW", "LOCALTIMESTAMP", "LOCALTIME"];

/// Column attributes that only need to be recognised
const IGNORED_ATTRIBUTES: &[&str] = &["UNSIGNED", "SIGNED", "ZEROFILL", "VISIBLE", "INVISIBLE", "BINARY"];

/// What a column definition declares beyond the column itself
#[derive(Default)]
struct ColumnConstraints {
    primary_key: bool,
    unique: bool,
}

/// Parses `CREATE [TEMPORARY] TABLE [IF NOT EXISTS] name (...) [options]`.
pub fn parse_create_table(cursor: Cursor<'_>) -> Result<(DdlStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("CREATE")?;
    let cursor = cursor.next_if_keyword("TEMPORARY").unwrap_or(cursor);
    let cursor = cursor.expect_keyword("TABLE")?;
    let (if_not_exists, cursor) = match cursor.next_if_keyword("IF NOT EXISTS") {
        Some(next) => (true, next),
        None => (false, cursor),
    };
    let (name, cursor) = cursor.next_name()?;
    let object = ObjectName::parse(&name);
    let mut definition = TableDefinition::new(object.name, object.database.unwrap_or_default());

    if !cursor.peek().is_some_and(Token::is_open_paren) {
        return Err(cursor.error("expected ( after table name".to_string()));
    }
    let open = cursor.position();
    let close = cursor.matching_paren()?;
    let body = cursor.slice(open + 1, close);
    if body.is_at_end() {
        return Err(cursor.error("a table must have at least one column".to_string()));
    }

    let mut primary_key: Vec<String> = Vec::new();
    let mut unique_columns: Vec<String> = Vec::new();
    let mut indexes: Vec<Index> = Vec::new();

    for (from, to) in body.split_top_level(0, body.len()) {
        let part = body.slice(from, to);
        if is_table_constraint(&part) {
            if let Some(index) = parse_table_constraint(part)? {
                indexes.push(index);
            }
            continue;
        }
        let (column, constraints) = parse_column_definition(part)?;
        if constraints.primary_key {
            primary_key.push(column.name.clone());
        }
        if constraints.unique {
            unique_columns.push(column.name.clone());
        }
        definition
            .add_column(column)
            .map_err(|err| Error::ParseError(err.to_string()))?;
    }

    if !primary_key.is_empty() {
        definition
            .set_primary_key(primary_key)
            .map_err(|err| Error::ParseError(err.to_string()))?;
    }
    for column in unique_columns {
        let name = definition.generate_index_name(&column);
        definition
            .add_index(Index {
                name,
                kind: IndexKind::Unique,
                columns: vec![column],
            })
            .map_err(|err| Error::ParseError(err.to_string()))?;
    }
    for mut index in indexes {
        if index.name.is_empty() {
            let first = index.columns.first().cloned().unwrap_or_default();
            index.name = definition.generate_index_name(&first);
        }
        definition
            .add_index(index)
            .map_err(|err| Error::ParseError(err.to_string()))?;
    }

    // Primary key columns never hold NULL
    let key_columns = definition.primary_key.clone();
    for column in definition.columns.iter_mut() {
        if key_columns.iter().any(|k| k.eq_ignore_ascii_case(&column.name)) {
            column.nullable = false;
        }
    }

    let (properties, cursor) = parse_table_options(cursor.jump(close + 1))?;
    for (key, value) in &properties {
        if key == "AUTO_INCREMENT" {
            let offset = value
                .parse::<i64>()
                .map_err(|_| Error::ParseError(format!("invalid AUTO_INCREMENT value {}", value)))?;
            if let Some(column) = definition.auto_increment_column().map(|c| c.name.clone()) {
                definition.auto_increment_offsets.insert(column, offset);
            }
        }
    }

    definition
        .validate()
        .map_err(|err| Error::ParseError(err.to_string()))?;

    Ok((
        DdlStatement::CreateTable {
            definition,
            if_not_exists,
            properties,
        },
        cursor,
    ))
}

fn is_table_constraint(part: &Cursor<'_>) -> bool {
    part.peek().is_some_and(|token| {
        token.kind == TokenKind::ReservedWord
            && matches!(
                token.value.as_str(),
                "PRIMARY KEY"
                    | "UNIQUE"
                    | "UNIQUE KEY"
                    | "UNIQUE INDEX"
                    | "KEY"
                    | "INDEX"
                    | "FULLTEXT"
                    | "FULLTEXT KEY"
                    | "FULLTEXT INDEX"
                    | "CONSTRAINT"
                    | "FOREIGN KEY"
            )
            || token.is("CHECK")
    })
}

/// A table-level key. Foreign keys and CHECK constraints are accepted but
/// not enforced, so they yield nothing.
fn parse_table_constraint(part: Cursor<'_>) -> Result<Option<Index>> {
    let mut cursor = part;
    if let Some(next) = cursor.next_if_keyword("CONSTRAINT") {
        cursor = next;
        // Optional constraint symbol
        if cursor.peek().is_some_and(|t| t.kind == TokenKind::Identifier) {
            cursor = cursor.advance();
        }
    }

    let (token, next) = cursor.next()?;
    let kind = match token.value.as_str() {
        "PRIMARY KEY" => IndexKind::Primary,
        "UNIQUE" | "UNIQUE KEY" | "UNIQUE INDEX" => IndexKind::Unique,
        "KEY" | "INDEX" => IndexKind::Index,
        "FULLTEXT" | "FULLTEXT KEY" | "FULLTEXT INDEX" => IndexKind::Fulltext,
        "FOREIGN KEY" => return Ok(None),
        _ if token.is("CHECK") => return Ok(None),
        _ => return Err(cursor.error(format!("unexpected {} in table definition", token))),
    };

    // UNIQUE KEY, UNIQUE INDEX written as separate words
    let mut cursor = next;
    if kind == IndexKind::Unique || kind == IndexKind::Fulltext {
        cursor = cursor
            .next_if_keyword("KEY")
            .or_else(|| cursor.next_if_keyword("INDEX"))
            .unwrap_or(cursor);
    }

    let mut name = String::new();
    if !cursor.peek().is_some_and(Token::is_open_paren) && !cursor.peek_is("USING") {
        let (index_name, next) = cursor.next_name_or_keyword()?;
        name = index_name;
        cursor = next;
    }
    cursor = skip_index_type(cursor);

    // Trailing index options (USING BTREE, COMMENT '...') are ignored
    let (columns, _) = parse_index_columns(cursor)?;

    let name = match kind {
        IndexKind::Primary => PRIMARY_KEY_NAME.to_string(),
        _ => name,
    };
    Ok(Some(Index {
        name,
        kind,
        columns,
    }))
}

fn skip_index_type(cursor: Cursor<'_>) -> Cursor<'_> {
    match cursor.next_if_keyword("USING") {
        Some(next) => next.advance(),
        None => cursor,
    }
}

/// `(col [(length)] [ASC|DESC], ...)`
fn parse_index_columns(cursor: Cursor<'_>) -> Result<(Vec<String>, Cursor<'_>)> {
    let mut cursor = cursor.expect_open_paren()?;
    let mut columns = Vec::new();
    loop {
        let (name, mut next) = cursor.next_name_or_keyword()?;
        columns.push(name);
        if next.peek().is_some_and(Token::is_open_paren) {
            next = next.jump(next.matching_paren()? + 1);
        }
        next = next
            .next_if_keyword("ASC")
            .or_else(|| next.next_if_keyword("DESC"))
            .unwrap_or(next);
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => return Ok((columns, next.expect_close_paren()?)),
        }
    }
}

/// `name type [attributes...]`
fn parse_column_definition(part: Cursor<'_>) -> Result<(Column, ColumnConstraints)> {
    let (name, cursor) = part.next_name_or_keyword()?;
    let (data_type, mut cursor) = parse_column_type(cursor)?;
    let mut column = Column::new(name, data_type);
    let mut constraints = ColumnConstraints::default();

    while let Some(token) = cursor.peek() {
        let next = cursor.advance();
        cursor = match token.value.to_ascii_uppercase().as_str() {
            "NOT NULL" if token.is_bare_word() => {
                column.nullable = false;
                next
            }
            "NULL" if token.kind == TokenKind::NullConstant => {
                column.nullable = true;
                next
            }
            "DEFAULT" if token.is_bare_word() => {
                let (default, next) = parse_column_default(next)?;
                column.default = default;
                next
            }
            "AUTO_INCREMENT" if token.is_bare_word() => {
                match &mut column.data_type {
                    ColumnType::Integer { auto_increment, .. } => *auto_increment = true,
                    _ => {
                        return Err(cursor.error(format!(
                            "AUTO_INCREMENT requires an integer column, '{}' is {}",
                            column.name, column.data_type
                        )))
                    }
                }
                next
            }
            "PRIMARY KEY" | "KEY" if token.is_bare_word() => {
                constraints.primary_key = true;
                next
            }
            "UNIQUE" | "UNIQUE KEY" if token.is_bare_word() => {
                constraints.unique = true;
                next.next_if_keyword("KEY").unwrap_or(next)
            }
            "COMMENT" if token.is_bare_word() => next.advance(),
            "CHARACTER SET" | "CHARSET" if token.is_bare_word() => {
                let (charset, next) = next.next_name_or_keyword()?;
                if let ColumnType::Character { charset: slot, .. } = &mut column.data_type {
                    *slot = Some(charset);
                }
                next
            }
            "COLLATE" if token.is_bare_word() => {
                let (collation, next) = next.next_name_or_keyword()?;
                if let ColumnType::Character { collation: slot, .. } = &mut column.data_type {
                    *slot = Some(collation);
                }
                next
            }
            "ON UPDATE" if token.is_bare_word() => {
                let (_, next) = parse_expression(next)?;
                next
            }
            // Inline REFERENCES / CHECK consume the rest of the definition
            "REFERENCES" | "CHECK" if token.is_bare_word() => next.jump(next.len()),
            word if token.is_bare_word() && IGNORED_ATTRIBUTES.contains(&word) => next,
            _ => {
                return Err(cursor.error(format!(
                    "unexpected {} in definition of column '{}'",
                    token, column.name
                )))
            }
        };
    }

    Ok((column, constraints))
}

/// The value after DEFAULT: a literal, NULL or the current timestamp
fn parse_column_default(cursor: Cursor<'_>) -> Result<(Option<ColumnDefault>, Cursor<'_>)> {
    let (expr, next) = parse_expression(cursor)?;
    let default = match expr.kind {
        ExprKind::Constant(Value::Null) => None,
        ExprKind::Constant(value) => Some(ColumnDefault::Value(value)),
        ExprKind::Function { ref name, .. } if TIMESTAMP_DEFAULTS.contains(&name.as_str()) => {
            Some(ColumnDefault::CurrentTimestamp)
        }
        _ => {
            return Err(cursor.error(format!("unsupported DEFAULT {}", expr.name)));
        }
    };
    Ok((default, next))
}

/// `ENGINE=InnoDB DEFAULT CHARSET=utf8 ...` as upper-cased key/value pairs
fn parse_table_options(cursor: Cursor<'_>) -> Result<(Vec<(String, String)>, Cursor<'_>)> {
    let mut options = Vec::new();
    let mut cursor = cursor;
    while let Some(token) = cursor.peek() {
        if !token.is_bare_word() {
            break;
        }
        let key = token.value.to_ascii_uppercase();
        let next = cursor.advance();
        let next = next.next_if_symbol("=").unwrap_or(next);
        let (value, next) = next.next()?;
        options.push((key, value.value.clone()));
        cursor = next.next_if_comma().unwrap_or(next);
    }
    Ok((options, cursor))
}

/// `ALTER TABLE t AUTO_INCREMENT [=] n`; no other ALTER form is supported.
pub fn parse_alter_table(cursor: Cursor<'_>) -> Result<(DdlStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("ALTER")?;
    let cursor = cursor.expect_keyword("TABLE")?;
    let (name, cursor) = cursor.next_name()?;
    let cursor = cursor
        .expect_keyword("AUTO_INCREMENT")
        .map_err(|_| cursor.error("only ALTER TABLE ... AUTO_INCREMENT is supported".to_string()))?;
    let cursor = cursor.next_if_symbol("=").unwrap_or(cursor);
    let (token, next) = cursor.next()?;
    let value = token
        .value
        .parse::<i64>()
        .map_err(|_| cursor.error(format!("expected integer, found {}", token)))?;
    Ok((
        DdlStatement::AlterTableAutoIncrement {
            table: ObjectName::parse(&name),
            value,
        },
        next,
    ))
}

/// `DROP [TEMPORARY] TABLE [IF EXISTS] a [, b ...]`
pub fn parse_drop_table(cursor: Cursor<'_>) -> Result<(DdlStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("DROP")?;
    let cursor = cursor.next_if_keyword("TEMPORARY").unwrap_or(cursor);
    let cursor = cursor.expect_keyword("TABLE")?;
    let (if_exists, mut cursor) = match cursor.next_if_keyword("IF EXISTS") {
        Some(next) => (true, next),
        None => (false, cursor),
    };
    let mut names = Vec::new();
    loop {
        let (name, next) = cursor.next_name()?;
        names.push(ObjectName::parse(&name));
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => {
                cursor = next;
                break;
            }
        }
    }
    Ok((DdlStatement::DropTable { names, if_exists }, cursor))
}

/// `TRUNCATE [TABLE] t`
pub fn parse_truncate(cursor: Cursor<'_>) -> Result<(DdlStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("TRUNCATE")?;
    let cursor = cursor.next_if_keyword("TABLE").unwrap_or(cursor);
    let (name, cursor) = cursor.next_name()?;
    Ok((
        DdlStatement::Truncate {
            table: ObjectName::parse(&name),
        },
        cursor,
    ))
}

/// `SHOW TABLES [LIKE 'pattern']` or `SHOW INDEX|INDEXES|KEYS FROM|IN t`
pub fn parse_show(cursor: Cursor<'_>) -> Result<(DdlStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("SHOW")?;
    let cursor = cursor.next_if_keyword("FULL").unwrap_or(cursor);

    if let Some(next) = cursor.next_if_keyword("TABLES") {
        if let Some(next) = next.next_if_keyword("LIKE") {
            let (token, after) = next.next()?;
            if token.kind != TokenKind::StringConstant {
                return Err(next.error(format!("expected pattern, found {}", token)));
            }
            return Ok((
                DdlStatement::ShowTables {
                    like: Some(token.value.clone()),
                },
                after,
            ));
        }
        return Ok((DdlStatement::ShowTables { like: None }, next));
    }

    if cursor.peek_is("INDEX") || cursor.peek_is("INDEXES") || cursor.peek_is("KEYS") {
        let next = cursor.advance();
        let next = next
            .next_if_keyword("FROM")
            .or_else(|| next.next_if_keyword("IN"))
            .ok_or_else(|| next.error("expected FROM".to_string()))?;
        let (name, after) = next.next_name()?;
        return Ok((
            DdlStatement::ShowIndex {
                table: ObjectName::parse(&name),
            },
            after,
        ));
    }

    Err(cursor.error("unsupported SHOW statement".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::tokenizer::tokenize;
    use crate::types::column::{CharacterKind, IntegerSize};

    fn create(sql: &str) -> Result<(TableDefinition, bool, Vec<(String, String)>)> {
        let tokens = tokenize(sql)?;
        let (statement, rest) = parse_create_table(Cursor::new(&tokens, sql))?;
        rest.expect_end()?;
        match statement {
            DdlStatement::CreateTable {
                definition,
                if_not_exists,
                properties,
            } => Ok((definition, if_not_exists, properties)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_create_table_with_keys() {
        let (definition, if_not_exists, properties) = create(
            "CREATE TABLE IF NOT EXISTS `users` (
                `id` int(10) unsigned NOT NULL AUTO_INCREMENT,
                `email` varchar(255) NOT NULL,
                `name` varchar(100) DEFAULT NULL COMMENT 'display name',
                `group_id` int DEFAULT '1',
                `created` datetime NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                PRIMARY KEY (`id`),
                UNIQUE KEY `email_idx` (`email`),
                KEY (`group_id`),
                CONSTRAINT fk FOREIGN KEY (group_id) REFERENCES groups (id)
            ) ENGINE=InnoDB AUTO_INCREMENT=100 DEFAULT CHARSET=utf8mb4",
        )
        .unwrap();

        assert!(if_not_exists);
        assert_eq!(definition.name, "users");
        assert_eq!(definition.columns.len(), 5);
        assert_eq!(definition.primary_key, vec!["id"]);
        assert!(definition.columns[0].is_auto_increment());
        assert!(!definition.columns[1].nullable);
        assert!(definition.columns[2].nullable);
        assert_eq!(definition.columns[2].default, None);
        assert_eq!(
            definition.columns[3].default,
            Some(ColumnDefault::Value(Value::from("1")))
        );
        assert_eq!(definition.columns[4].default, Some(ColumnDefault::CurrentTimestamp));

        let names: Vec<_> = definition.indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["PRIMARY", "email_idx", "group_id"]);
        assert_eq!(definition.auto_increment_offsets.get("id"), Some(&100));
        assert!(properties.contains(&("ENGINE".to_string(), "InnoDB".to_string())));
        assert!(properties.contains(&("DEFAULT CHARSET".to_string(), "utf8mb4".to_string())));
    }

    #[test]
    fn test_inline_primary_key_and_unique() {
        let (definition, _, _) =
            create("CREATE TABLE t (id BIGINT PRIMARY KEY, code CHAR(3) UNIQUE, n INT DEFAULT -1)")
                .unwrap();
        assert_eq!(definition.primary_key, vec!["id"]);
        assert!(!definition.columns[0].nullable);
        assert!(matches!(
            definition.columns[0].data_type,
            ColumnType::Integer {
                size: IntegerSize::Big,
                ..
            }
        ));
        assert!(matches!(
            definition.columns[1].data_type,
            ColumnType::Character {
                kind: CharacterKind::Char,
                max_length: 3,
                ..
            }
        ));
        assert_eq!(definition.indexes[1].kind, IndexKind::Unique);
        assert_eq!(definition.indexes[1].name, "code");
        assert_eq!(
            definition.columns[2].default,
            Some(ColumnDefault::Value(Value::Int(-1)))
        );
    }

    #[test]
    fn test_bad_definitions() {
        assert!(create("CREATE TABLE t ()").is_err());
        assert!(create("CREATE TABLE t (name VARCHAR(10) AUTO_INCREMENT)").is_err());
        assert!(create("CREATE TABLE t (id INT, PRIMARY KEY (missing))").is_err());
        assert!(create("CREATE TABLE t (id INT, id INT)").is_err());
    }

    #[test]
    fn test_drop_truncate_alter_show() {
        let sql = "DROP TABLE IF EXISTS a, db.b";
        let tokens = tokenize(sql).unwrap();
        let (statement, _) = parse_drop_table(Cursor::new(&tokens, sql)).unwrap();
        match statement {
            DdlStatement::DropTable { names, if_exists } => {
                assert!(if_exists);
                assert_eq!(names[1].database.as_deref(), Some("db"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let sql = "ALTER TABLE t AUTO_INCREMENT = 50";
        let tokens = tokenize(sql).unwrap();
        let (statement, _) = parse_alter_table(Cursor::new(&tokens, sql)).unwrap();
        assert!(matches!(statement, DdlStatement::AlterTableAutoIncrement { value: 50, .. }));

        let sql = "ALTER TABLE t ADD COLUMN x INT";
        let tokens = tokenize(sql).unwrap();
        assert!(parse_alter_table(Cursor::new(&tokens, sql)).is_err());

        let sql = "SHOW TABLES LIKE 'us%'";
        let tokens = tokenize(sql).unwrap();
        let (statement, _) = parse_show(Cursor::new(&tokens, sql)).unwrap();
        assert_eq!(
            statement,
            DdlStatement::ShowTables {
                like: Some("us%".into())
            }
        );

        let sql = "SHOW KEYS FROM users";
        let tokens = tokenize(sql).unwrap();
        let (statement, _) = parse_show(Cursor::new(&tokens, sql)).unwrap();
        assert!(matches!(statement, DdlStatement::ShowIndex { .. }));

        let sql = "TRUNCATE logs";
        let tokens = tokenize(sql).unwrap();
        let (statement, _) = parse_truncate(Cursor::new(&tokens, sql)).unwrap();
        assert!(matches!(statement, DdlStatement::Truncate { .. }));
    }
}
