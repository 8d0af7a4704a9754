//! DML (Data Manipulation Language) statement parser module
//!
//! Handles parsing of SELECT, INSERT, UPDATE, and DELETE statements. The
//! FROM, ORDER BY, LIMIT and SET sub-parsers are shared between them; each
//! takes a cursor and returns the cursor after what it consumed.

use super::expr_parser::{parse_complete_expression, parse_expression, parse_expression_list};
use super::token_helper::Cursor;
use crate::error::{Error, Result};
use crate::parsing::ast::{
    Assignment, BinaryOperator, DeleteStatement, Direction, ExprKind, Expression, FromClause,
    IndexHint, IndexHintKind, InsertSource, InsertStatement, JoinOperator, JoinType, Limit,
    ObjectName, OrderByItem, SelectItem, SelectStatement, SetOperation, TableReference,
    UpdateStatement,
};
use crate::parsing::token::{Token, TokenKind};

/// Clauses of a SELECT core, in the only order they may appear
const SELECT_CLAUSES: &[&str] = &[
    "FROM",
    "WHERE",
    "GROUP BY",
    "HAVING",
    "ORDER BY",
    "LIMIT",
    "FOR UPDATE",
    "LOCK IN SHARE MODE",
];

const UPDATE_CLAUSES: &[&str] = &["WHERE", "ORDER BY", "LIMIT"];

/// Enforces a total order over a statement's clauses: a clause that comes
/// before, or repeats, the previous one is a parse error.
struct ClauseSequence {
    clauses: &'static [&'static str],
    last: Option<usize>,
}

impl ClauseSequence {
    fn new(clauses: &'static [&'static str]) -> Self {
        Self {
            clauses,
            last: None,
        }
    }

    /// The clause the cursor is on, if it is one of ours
    fn next_clause(&mut self, cursor: &Cursor<'_>) -> Result<Option<&'static str>> {
        let Some(token) = cursor.peek() else {
            return Ok(None);
        };
        if token.kind != TokenKind::ClauseKeyword {
            return Ok(None);
        }
        let Some(rank) = self.clauses.iter().position(|clause| token.is(clause)) else {
            return Ok(None);
        };
        if self.last.is_some_and(|last| rank <= last) {
            return Err(cursor.error(format!("{} clause is out of order", token.value)));
        }
        self.last = Some(rank);
        Ok(Some(self.clauses[rank]))
    }
}

/// Parses a SELECT statement, including UNION/INTERSECT/EXCEPT siblings.
pub fn parse_select(cursor: Cursor<'_>) -> Result<(SelectStatement, Cursor<'_>)> {
    let (mut select, parenthesized, mut cursor) = parse_select_operand(cursor)?;
    let mut last_parenthesized = parenthesized;

    while let Some((operation, next)) = next_set_operation(cursor) {
        let (sibling, parenthesized, next) = parse_select_operand(next)?;
        select.compound.push((operation, sibling));
        last_parenthesized = parenthesized;
        cursor = next;
    }

    // ORDER BY / LIMIT written after an unparenthesized last sibling belong
    // to the combined result
    if !last_parenthesized {
        if let Some((_, last)) = select.compound.last_mut() {
            select.compound_order_by = std::mem::take(&mut last.order_by);
            select.compound_limit = last.limit.take();
        }
    } else {
        if let Some(next) = cursor.next_if_keyword("ORDER BY") {
            let (order_by, next) = parse_order_by(next)?;
            select.compound_order_by = order_by;
            cursor = next;
        }
        if let Some(next) = cursor.next_if_keyword("LIMIT") {
            let (limit, next) = parse_limit(next)?;
            select.compound_limit = Some(limit);
            cursor = next;
        }
    }

    Ok((select, cursor))
}

/// One operand of a compound query: a core or a parenthesized query
fn parse_select_operand(cursor: Cursor<'_>) -> Result<(SelectStatement, bool, Cursor<'_>)> {
    if cursor.peek().is_some_and(Token::is_open_paren) {
        let open = cursor.position();
        let close = cursor.matching_paren()?;
        let (select, rest) = parse_select(cursor.slice(open + 1, close))?;
        rest.expect_end()?;
        return Ok((select, true, cursor.jump(close + 1)));
    }
    let (select, cursor) = parse_select_core(cursor)?;
    Ok((select, false, cursor))
}

fn next_set_operation(cursor: Cursor<'_>) -> Option<(SetOperation, Cursor<'_>)> {
    let token = cursor.peek()?;
    if token.kind != TokenKind::ClauseKeyword {
        return None;
    }
    let operation = match token.value.as_str() {
        "UNION" | "UNION DISTINCT" => SetOperation::Union,
        "UNION ALL" => SetOperation::UnionAll,
        "INTERSECT" => SetOperation::Intersect,
        "EXCEPT" => SetOperation::Except,
        _ => return None,
    };
    Some((operation, cursor.advance()))
}

/// `SELECT [DISTINCT] items [FROM ...] [WHERE ...] ...`
fn parse_select_core(cursor: Cursor<'_>) -> Result<(SelectStatement, Cursor<'_>)> {
    let mut cursor = cursor.expect_keyword("SELECT")?;
    let mut select = SelectStatement::default();

    if let Some(next) = cursor.next_if_keyword("DISTINCT") {
        select.distinct = true;
        cursor = next;
    } else if let Some(next) = cursor.next_if_keyword("ALL") {
        cursor = next;
    }

    loop {
        let (item, next) = parse_select_item(cursor)?;
        select.select.push(item);
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => {
                cursor = next;
                break;
            }
        }
    }

    let mut clauses = ClauseSequence::new(SELECT_CLAUSES);
    while let Some(clause) = clauses.next_clause(&cursor)? {
        let next = cursor.advance();
        cursor = match clause {
            "FROM" => {
                let (from, next) = parse_from(next)?;
                select.from = Some(from);
                next
            }
            "WHERE" => {
                let (expr, next) = parse_expression(next)?;
                select.r#where = Some(expr);
                next
            }
            "GROUP BY" => {
                let (group_by, next) = parse_expression_list(next)?;
                select.group_by = group_by;
                next
            }
            "HAVING" => {
                let (expr, next) = parse_expression(next)?;
                select.having = Some(expr);
                next
            }
            "ORDER BY" => {
                let (order_by, next) = parse_order_by(next)?;
                select.order_by = order_by;
                next
            }
            "LIMIT" => {
                let (limit, next) = parse_limit(next)?;
                select.limit = Some(limit);
                next
            }
            // Locking reads are accepted and ignored
            _ => next,
        };
    }

    Ok((select, cursor))
}

/// `expr [[AS] alias]`
fn parse_select_item(cursor: Cursor<'_>) -> Result<(SelectItem, Cursor<'_>)> {
    let (expr, cursor) = parse_expression(cursor)?;
    let (alias, cursor) = parse_alias(cursor, true)?;
    Ok((SelectItem { expr, alias }, cursor))
}

/// `[AS] alias`. A string literal may name a select item but not a table.
fn parse_alias(cursor: Cursor<'_>, allow_string: bool) -> Result<(Option<String>, Cursor<'_>)> {
    if let Some(next) = cursor.next_if_keyword("AS") {
        let (token, after) = next.next()?;
        return match token.kind {
            TokenKind::Identifier if token.value != "*" => Ok((Some(token.value.clone()), after)),
            TokenKind::StringConstant if allow_string => Ok((Some(token.value.clone()), after)),
            _ => Err(next.error(format!("expected alias, found {}", token))),
        };
    }
    match cursor.peek() {
        Some(token) if token.kind == TokenKind::Identifier && token.value != "*" => {
            Ok((Some(token.value.clone()), cursor.advance()))
        }
        Some(token) if allow_string && token.kind == TokenKind::StringConstant => {
            Ok((Some(token.value.clone()), cursor.advance()))
        }
        _ => Ok((None, cursor)),
    }
}

/// Parses the table references of a FROM clause, with the cursor after FROM.
pub fn parse_from(cursor: Cursor<'_>) -> Result<(FromClause, Cursor<'_>)> {
    let (first, mut cursor) = parse_table_factor(cursor)?;
    let mut tables = vec![first];

    loop {
        let join_type = if let Some(next) = cursor.next_if_comma() {
            cursor = next;
            JoinType::Join
        } else if let Some(join_type) = cursor
            .peek()
            .filter(|t| t.kind == TokenKind::ReservedWord)
            .and_then(|t| JoinType::from_keyword(&t.value))
        {
            cursor = cursor.advance();
            join_type
        } else {
            break;
        };

        let (mut table, next) = parse_table_factor(cursor)?;
        cursor = next;
        table.join_type = Some(join_type);

        if let Some(next) = cursor.next_if_keyword("ON") {
            let (expr, next) = parse_expression(next)?;
            table.join_operator = Some(JoinOperator::On);
            table.join_expression = Some(expr);
            cursor = next;
        } else if let Some(next) = cursor.next_if_keyword("USING") {
            let (columns, next) = parse_name_list(next)?;
            let previous = tables.last().map(|t| t.qualifier().to_string()).unwrap_or_default();
            table.join_expression = Some(using_condition(&previous, table.qualifier(), &columns));
            table.join_operator = Some(JoinOperator::Using(columns));
            cursor = next;
        }

        tables.push(table);
    }

    Ok((FromClause { tables }, cursor))
}

/// `left.c = right.c AND ...` for `USING (c, ...)`
pub fn using_condition(left: &str, right: &str, columns: &[String]) -> Expression {
    let mut condition: Option<Expression> = None;
    for column in columns {
        let equality = Expression::new(
            ExprKind::Binary {
                op: BinaryOperator::Equal,
                left: Box::new(Expression::column(Some(left), column)),
                right: Box::new(Expression::column(Some(right), column)),
            },
            format!("{}.{} = {}.{}", left, column, right, column),
        );
        condition = Some(match condition {
            None => equality,
            Some(previous) => {
                let name = format!("{} AND {}", previous.name, equality.name);
                Expression::new(
                    ExprKind::Binary {
                        op: BinaryOperator::And,
                        left: Box::new(previous),
                        right: Box::new(equality),
                    },
                    name,
                )
            }
        });
    }
    condition.unwrap_or_else(|| Expression::constant(shadow_value::Value::Int(1), "1"))
}

/// A table name or derived table with its alias and index hints
fn parse_table_factor(cursor: Cursor<'_>) -> Result<(TableReference, Cursor<'_>)> {
    if cursor.peek().is_some_and(Token::is_open_paren) {
        let open = cursor.position();
        let close = cursor.matching_paren()?;
        let inner = cursor.slice(open + 1, close);
        if !inner.peek_is("SELECT") && !inner.peek().is_some_and(Token::is_open_paren) {
            return Err(cursor.error("expected subquery".to_string()));
        }
        let (subquery, rest) = parse_select(inner)?;
        rest.expect_end()?;

        let (alias, next) = parse_alias(cursor.jump(close + 1), false)?;
        let alias = alias.ok_or_else(|| next.error("every derived table must have an alias".to_string()))?;
        let mut table = TableReference::table(alias.clone());
        table.alias = Some(alias);
        table.subquery = Some(Box::new(subquery));
        return Ok((table, next));
    }

    let (name, cursor) = cursor.next_name()?;
    let object = ObjectName::parse(&name);
    let mut table = TableReference::table(object.name);
    table.database = object.database;

    let (alias, mut cursor) = parse_alias(cursor, false)?;
    table.alias = alias;

    while let Some((kind, next)) = next_index_hint(cursor) {
        let (indexes, next) = parse_name_list(next)?;
        let (scope, next) = match next.peek() {
            Some(token) if token.is("FOR JOIN") => (Some("JOIN".to_string()), next.advance()),
            Some(token) if token.is("FOR ORDER BY") => (Some("ORDER BY".to_string()), next.advance()),
            Some(token) if token.is("FOR GROUP BY") => (Some("GROUP BY".to_string()), next.advance()),
            _ => (None, next),
        };
        table.index_hints.push(IndexHint {
            kind,
            indexes,
            scope,
        });
        cursor = next;
    }

    Ok((table, cursor))
}

fn next_index_hint(cursor: Cursor<'_>) -> Option<(IndexHintKind, Cursor<'_>)> {
    let token = cursor.peek()?;
    if token.kind != TokenKind::ReservedWord {
        return None;
    }
    let kind = match token.value.as_str() {
        "USE INDEX" | "USE KEY" => IndexHintKind::Use,
        "IGNORE INDEX" | "IGNORE KEY" => IndexHintKind::Ignore,
        "FORCE INDEX" | "FORCE KEY" => IndexHintKind::Force,
        _ => return None,
    };
    Some((kind, cursor.advance()))
}

/// `(name, ...)`, allowing an empty list
pub fn parse_name_list(cursor: Cursor<'_>) -> Result<(Vec<String>, Cursor<'_>)> {
    let mut cursor = cursor.expect_open_paren()?;
    let mut names = Vec::new();
    if let Some(next) = cursor.next_if(Token::is_close_paren) {
        return Ok((names, next.1));
    }
    loop {
        let (name, next) = cursor.next_name_or_keyword()?;
        names.push(name);
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => return Ok((names, next.expect_close_paren()?)),
        }
    }
}

/// Parses ORDER BY items, with the cursor after ORDER BY.
pub fn parse_order_by(cursor: Cursor<'_>) -> Result<(Vec<OrderByItem>, Cursor<'_>)> {
    let mut items = Vec::new();
    let mut cursor = cursor;
    loop {
        let (expr, next) = parse_expression(cursor)?;
        let (direction, next) = if let Some(after) = next.next_if_keyword("DESC") {
            (Direction::Desc, after)
        } else if let Some(after) = next.next_if_keyword("ASC") {
            (Direction::Asc, after)
        } else {
            (Direction::Asc, next)
        };
        items.push(OrderByItem { expr, direction });
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => return Ok((items, next)),
        }
    }
}

/// Parses `count`, `offset, count` or `count OFFSET offset`, with the
/// cursor after LIMIT.
pub fn parse_limit(cursor: Cursor<'_>) -> Result<(Limit, Cursor<'_>)> {
    let (first, cursor) = parse_expression(cursor)?;
    if let Some(next) = cursor.next_if_comma() {
        let (count, next) = parse_expression(next)?;
        return Ok((
            Limit {
                offset: Some(first),
                count,
            },
            next,
        ));
    }
    if let Some(next) = cursor.next_if_keyword("OFFSET") {
        let (offset, next) = parse_expression(next)?;
        return Ok((
            Limit {
                offset: Some(offset),
                count: first,
            },
            next,
        ));
    }
    Ok((
        Limit {
            offset: None,
            count: first,
        },
        cursor,
    ))
}

/// Parses `col = expr [, ...]`.
pub fn parse_assignments(cursor: Cursor<'_>) -> Result<(Vec<Assignment>, Cursor<'_>)> {
    let mut assignments = Vec::new();
    let mut cursor = cursor;
    loop {
        let (name, next) = cursor.next_name_or_keyword()?;
        let column = name.rsplit('.').next().unwrap_or(&name).to_string();
        let next = next.expect_symbol("=")?;
        let (value, next) = parse_expression(next)?;
        assignments.push(Assignment { column, value });
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => return Ok((assignments, next)),
        }
    }
}

/// `INSERT [IGNORE] [INTO] t [(cols)] VALUES (...) | SELECT ... | SET ...
/// [ON DUPLICATE KEY UPDATE ...]`
pub fn parse_insert(cursor: Cursor<'_>) -> Result<(InsertStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("INSERT")?;
    let (ignore, cursor) = match cursor.next_if_keyword("IGNORE") {
        Some(next) => (true, next),
        None => (false, cursor),
    };
    let cursor = cursor.next_if_keyword("INTO").unwrap_or(cursor);
    let (name, mut cursor) = cursor.next_name()?;
    let table = ObjectName::parse(&name);

    let mut columns = Vec::new();
    if cursor.peek().is_some_and(Token::is_open_paren)
        && !cursor.peek_nth(1).is_some_and(|t| t.is("SELECT"))
    {
        let (names, next) = parse_name_list(cursor)?;
        columns = names;
        cursor = next;
    }

    let (source, mut cursor) = if let Some(next) = cursor
        .next_if_keyword("VALUES")
        .or_else(|| cursor.next_if_keyword("VALUE"))
    {
        let (rows, next) = parse_values_rows(next, &columns)?;
        (InsertSource::Values(rows), next)
    } else if let Some(next) = cursor.next_if_keyword("SET") {
        if !columns.is_empty() {
            return Err(cursor.error("INSERT ... SET cannot name columns".to_string()));
        }
        let (assignments, next) = parse_assignments(next)?;
        let (names, values): (Vec<_>, Vec<_>) = assignments
            .into_iter()
            .map(|assignment| (assignment.column, assignment.value))
            .unzip();
        columns = names;
        (InsertSource::Values(vec![values]), next)
    } else if cursor.peek_is("SELECT") || cursor.peek().is_some_and(Token::is_open_paren) {
        let (select, next) = parse_select(cursor)?;
        (InsertSource::Select(Box::new(select)), next)
    } else {
        return Err(cursor.error("expected VALUES, SET or SELECT".to_string()));
    };

    let mut on_duplicate = Vec::new();
    if let Some(next) = cursor.next_if_keyword("ON DUPLICATE KEY UPDATE") {
        let (assignments, next) = parse_assignments(next)?;
        on_duplicate = assignments;
        cursor = next;
    }

    Ok((
        InsertStatement {
            table,
            columns,
            source,
            on_duplicate,
            ignore,
        },
        cursor,
    ))
}

/// `(expr, ...), (expr, ...)`: every row must match the column list, or
/// the first row when no columns were named
fn parse_values_rows<'a>(
    cursor: Cursor<'a>,
    columns: &[String],
) -> Result<(Vec<Vec<Expression>>, Cursor<'a>)> {
    let mut rows: Vec<Vec<Expression>> = Vec::new();
    let mut cursor = cursor;
    loop {
        if !cursor.peek().is_some_and(Token::is_open_paren) {
            return Err(cursor.error("expected ( to start a row of values".to_string()));
        }
        let open = cursor.position();
        let close = cursor.matching_paren()?;
        let inner = cursor.slice(open + 1, close);
        let row = if inner.is_at_end() {
            Vec::new()
        } else {
            inner
                .split_top_level(0, inner.len())
                .into_iter()
                .map(|(from, to)| parse_complete_expression(inner.slice(from, to)))
                .collect::<Result<Vec<_>>>()?
        };

        let expected = if columns.is_empty() {
            rows.first().map(Vec::len)
        } else {
            Some(columns.len())
        };
        if expected.is_some_and(|n| n != row.len()) {
            return Err(Error::ParseError(format!(
                "Column count doesn't match value count at row {}",
                rows.len() + 1
            )));
        }
        rows.push(row);

        let next = cursor.jump(close + 1);
        match next.next_if_comma() {
            Some(after) => cursor = after,
            None => return Ok((rows, next)),
        }
    }
}

/// `UPDATE [IGNORE] t [[AS] alias] SET ... [WHERE] [ORDER BY] [LIMIT]`
pub fn parse_update(cursor: Cursor<'_>) -> Result<(UpdateStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("UPDATE")?;
    let cursor = cursor.next_if_keyword("IGNORE").unwrap_or(cursor);
    let (name, cursor) = cursor.next_name()?;
    let (alias, cursor) = parse_alias(cursor, false)?;
    let cursor = cursor.expect_keyword("SET")?;
    let (set, mut cursor) = parse_assignments(cursor)?;

    let mut update = UpdateStatement {
        table: ObjectName::parse(&name),
        alias,
        set,
        r#where: None,
        order_by: Vec::new(),
        limit: None,
    };

    let mut clauses = ClauseSequence::new(UPDATE_CLAUSES);
    while let Some(clause) = clauses.next_clause(&cursor)? {
        let next = cursor.advance();
        cursor = match clause {
            "WHERE" => {
                let (expr, next) = parse_expression(next)?;
                update.r#where = Some(expr);
                next
            }
            "ORDER BY" => {
                let (order_by, next) = parse_order_by(next)?;
                update.order_by = order_by;
                next
            }
            _ => {
                let (limit, next) = parse_limit(next)?;
                update.limit = Some(limit);
                next
            }
        };
    }

    Ok((update, cursor))
}

/// `DELETE [IGNORE] FROM t [[AS] alias] [WHERE] [ORDER BY] [LIMIT]`
pub fn parse_delete(cursor: Cursor<'_>) -> Result<(DeleteStatement, Cursor<'_>)> {
    let cursor = cursor.expect_keyword("DELETE")?;
    let cursor = cursor.next_if_keyword("IGNORE").unwrap_or(cursor);
    let cursor = cursor.expect_keyword("FROM")?;
    let (name, cursor) = cursor.next_name()?;
    let (alias, mut cursor) = parse_alias(cursor, false)?;

    let mut delete = DeleteStatement {
        table: ObjectName::parse(&name),
        alias,
        r#where: None,
        order_by: Vec::new(),
        limit: None,
    };

    let mut clauses = ClauseSequence::new(UPDATE_CLAUSES);
    while let Some(clause) = clauses.next_clause(&cursor)? {
        let next = cursor.advance();
        cursor = match clause {
            "WHERE" => {
                let (expr, next) = parse_expression(next)?;
                delete.r#where = Some(expr);
                next
            }
            "ORDER BY" => {
                let (order_by, next) = parse_order_by(next)?;
                delete.order_by = order_by;
                next
            }
            _ => {
                let (limit, next) = parse_limit(next)?;
                delete.limit = Some(limit);
                next
            }
        };
    }

    Ok((delete, cursor))
}
