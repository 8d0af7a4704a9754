//! GROUP BY partitioning

use super::{Executor, Scope};
use crate::error::{Error, Result};
use crate::parsing::ast::{ExprKind, Expression, SelectStatement};
use crate::types::column::Column;
use crate::types::query::{split_key, Row};
use shadow_value::Value;
use std::collections::HashMap;

/// Resolve a GROUP BY item: a bare integer is a 1-based select-list
/// position, and a bare name that is not a source column but is a select
/// alias stands for the aliased expression.
pub(super) fn resolve_group_expr<'s>(
    expr: &'s Expression,
    select: &'s SelectStatement,
    columns: &[Column],
) -> Result<&'s Expression> {
    match &expr.kind {
        ExprKind::Constant(Value::Int(position)) => {
            let item = usize::try_from(*position)
                .ok()
                .and_then(|p| p.checked_sub(1))
                .and_then(|index| select.select.get(index))
                .ok_or_else(|| {
                    Error::ColumnNotFound(format!("{} in 'group statement'", position))
                })?;
            Ok(&item.expr)
        }
        ExprKind::Column { table: None, name } => {
            let is_source = columns
                .iter()
                .any(|c| split_key(&c.name).1.eq_ignore_ascii_case(name));
            if is_source {
                return Ok(expr);
            }
            Ok(select
                .select
                .iter()
                .find(|item| {
                    item.alias
                        .as_deref()
                        .is_some_and(|alias| alias.eq_ignore_ascii_case(name))
                })
                .map_or(expr, |item| &item.expr))
        }
        _ => Ok(expr),
    }
}

impl Executor<'_> {
    /// Partition rows by their GROUP BY key, groups in order of first
    /// appearance. Without GROUP BY every row lands in one group, which
    /// exists even when there are no rows.
    pub(super) fn group_rows(
        &mut self,
        select: &SelectStatement,
        rows: Vec<Row>,
        columns: &[Column],
        outer: Option<&Scope>,
    ) -> Result<Vec<Vec<Row>>> {
        if select.group_by.is_empty() {
            return Ok(vec![rows]);
        }
        let keys = select
            .group_by
            .iter()
            .map(|expr| resolve_group_expr(expr, select, columns))
            .collect::<Result<Vec<_>>>()?;

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<Vec<Row>> = Vec::new();
        for row in rows {
            let scope = Scope::new(&row).with_outer(outer);
            let mut encoded = Vec::with_capacity(keys.len());
            for key in &keys {
                encoded.push(self.evaluate(key, &scope)?.key());
            }
            let encoded = encoded.join("\u{1}");
            match index.get(&encoded) {
                Some(&position) => groups[position].push(row),
                None => {
                    index.insert(encoded, groups.len());
                    groups.push(vec![row]);
                }
            }
        }
        Ok(groups)
    }
}
