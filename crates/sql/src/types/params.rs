//! Bound statement parameters

use shadow_value::Value;
use std::collections::HashMap;

/// Values for `?` (1-based, in source order) and `:name` placeholders
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    positional: Vec<Value>,
    named: HashMap<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            named: HashMap::new(),
        }
    }

    /// Append the next positional value
    pub fn push(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Bind a named value; a leading `:` is ignored
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.named
            .insert(name.trim_start_matches(':').to_string(), value.into());
        self
    }

    /// Value for the `ordinal`-th `?`, counting from 1
    pub fn get_positional(&self, ordinal: usize) -> Option<&Value> {
        ordinal.checked_sub(1).and_then(|i| self.positional.get(i))
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let params = Params::new().push(1).push("a").with(":id", 9);
        assert_eq!(params.get_positional(1), Some(&Value::Int(1)));
        assert_eq!(params.get_positional(2), Some(&Value::from("a")));
        assert_eq!(params.get_positional(0), None);
        assert_eq!(params.get_named("id"), Some(&Value::Int(9)));
    }
}
