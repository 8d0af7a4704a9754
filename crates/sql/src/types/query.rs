//! Rows and query results

use super::column::Column;
use serde::{Deserialize, Serialize};
use shadow_value::Value;

/// Separator between table qualifier and column name in row keys built
/// during FROM/JOIN evaluation
pub const QUALIFIER_SEPARATOR: &str = ".%.";

/// Key under which a column of a joined table is stored
pub fn qualified_key(qualifier: &str, column: &str) -> String {
    format!("{}{}{}", qualifier, QUALIFIER_SEPARATOR, column)
}

/// Split a row key into its qualifier (if any) and bare column name
pub fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.split_once(QUALIFIER_SEPARATOR) {
        Some((qualifier, column)) => (Some(qualifier), column),
        None => (None, key),
    }
}

/// An ordered mapping of column name to value
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Exact key lookup
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Key lookup that ignores ASCII case, preferring an exact match
    pub fn get_ignore_case(&self, key: &str) -> Option<&Value> {
        self.get(key).or_else(|| {
            self.entries
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v)
        })
    }

    /// Find the first qualified entry for `column`, whatever its qualifier
    pub fn get_unqualified(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| {
                let (_, name) = split_key(k);
                name.eq_ignore_ascii_case(column)
            })
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value, overwriting an existing entry in place
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Set the value of an existing entry matched without regard to case,
    /// or append it
    pub fn set_ignore_case(&mut self, key: &str, value: Value) {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let position = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Append every entry of `other`
    pub fn extend_from(&mut self, other: &Row) {
        for (k, v) in &other.entries {
            self.insert(k.clone(), v.clone());
        }
    }

    /// Encoding of the values in order, used for DISTINCT and set operations
    pub fn value_key(&self) -> String {
        let keys: Vec<String> = self.values().map(Value::key).collect();
        keys.join("\u{1}")
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Rows plus the columns describing them.
///
/// `grouped_rows` holds the GROUP BY partitions while a query is being
/// evaluated; it is only present when grouping or an aggregate asked for it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    pub rows: Vec<Row>,
    pub columns: Vec<Column>,
    pub grouped_rows: Option<Vec<Vec<Row>>>,
}

impl QueryResult {
    pub fn new(rows: Vec<Row>, columns: Vec<Column>) -> Self {
        Self {
            rows,
            columns,
            grouped_rows: None,
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column across all rows, NULL where a row lacks it
    pub fn values(&self, column: &str) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// The single value of a one-row, one-column result
    pub fn scalar(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.values().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut row = Row::new();
        row.insert("a", Value::Int(1));
        row.insert("b", Value::Int(2));
        row.insert("a", Value::Int(3));
        assert_eq!(row.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_qualified_keys() {
        let key = qualified_key("t", "id");
        assert_eq!(key, "t.%.id");
        assert_eq!(split_key(&key), (Some("t"), "id"));
        assert_eq!(split_key("id"), (None, "id"));

        let mut row = Row::new();
        row.insert(key, Value::Int(7));
        assert_eq!(row.get_unqualified("ID"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_value_key_ignores_names() {
        let a: Row = vec![("x".to_string(), Value::Int(1))].into_iter().collect();
        let b: Row = vec![("y".to_string(), Value::Float(1.0))].into_iter().collect();
        assert_eq!(a.value_key(), b.value_key());
    }
}
