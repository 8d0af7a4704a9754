//! Per-session execution context

use crate::config::EngineConfig;
use chrono::NaiveDateTime;
use shadow_value::Value;
use std::collections::HashMap;

/// Server and database names used when nothing else is configured
pub const DEFAULT_SERVER: &str = "default";
pub const DEFAULT_DATABASE: &str = "default";

/// State threaded through every statement a session executes
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Server the session's tables live on
    pub server: String,
    /// Database unqualified table names resolve against
    pub database: String,
    pub config: EngineConfig,
    /// Session variables keyed by lower-cased name without `@`
    pub variables: HashMap<String, Value>,
    /// First auto-increment value generated by the latest INSERT
    pub last_insert_id: Option<i64>,
    /// Wall-clock time fixed at the start of each statement
    pub statement_time: NaiveDateTime,
}

impl ExecutionContext {
    pub fn new(server: impl Into<String>, database: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
            config,
            variables: HashMap::new(),
            last_insert_id: None,
            statement_time: chrono::Local::now().naive_local(),
        }
    }

    /// Refresh per-statement state
    pub fn begin_statement(&mut self) {
        self.statement_time = chrono::Local::now().naive_local();
    }

    /// Read a variable; unset variables are NULL
    pub fn variable(&self, name: &str) -> Value {
        self.variables
            .get(&normalize_variable(name))
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(normalize_variable(name), value);
    }

    /// Database for a possibly unqualified table reference
    pub fn database_or_default<'a>(&'a self, database: Option<&'a str>) -> &'a str {
        database.unwrap_or(&self.database)
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(DEFAULT_SERVER, DEFAULT_DATABASE, EngineConfig::default())
    }
}

/// Variable names are case-insensitive and stored without the `@`
pub fn normalize_variable(name: &str) -> String {
    name.trim_start_matches('@').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_are_case_insensitive() {
        let mut ctx = ExecutionContext::default();
        ctx.set_variable("@Counter", Value::Int(3));
        assert_eq!(ctx.variable("counter"), Value::Int(3));
        assert_eq!(ctx.variable("@COUNTER"), Value::Int(3));
        assert_eq!(ctx.variable("@missing"), Value::Null);
    }
}
