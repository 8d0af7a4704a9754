//! String coercions: character/binary columns, ENUM and SET

use crate::error::{Error, Result};
use shadow_value::Value;
use tracing::warn;

/// Text form of a value for a character column. Integral floats drop
/// their fraction as MySQL prints them.
fn text_of(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Coerces into a character column, truncating to `max_length` characters
/// unless `strict`.
pub fn coerce_character(column: &str, value: &Value, max_length: u64, strict: bool) -> Result<Value> {
    let text = text_of(value);
    let length = text.chars().count() as u64;
    if length <= max_length {
        return Ok(Value::Str(text));
    }
    if strict {
        return Err(Error::DataTooLong(column.to_string()));
    }
    warn!(column, length, max_length, "string too long, truncated");
    Ok(Value::Str(text.chars().take(max_length as usize).collect()))
}

/// Coerces into an ENUM column. Members match without regard to case and
/// are stored in their declared spelling; a number picks the member at
/// that 1-based position.
pub fn coerce_enum(column: &str, value: &Value, members: &[String], strict: bool) -> Result<Value> {
    let found = match value {
        Value::Int(i) if *i >= 1 => members.get(*i as usize - 1).cloned(),
        Value::Int(0) => Some(String::new()),
        other => {
            let text = text_of(other);
            members
                .iter()
                .find(|member| member.eq_ignore_ascii_case(text.trim_end()))
                .cloned()
        }
    };
    match found {
        Some(member) => Ok(Value::Str(member)),
        None if strict => Err(Error::InvalidValue(format!(
            "Data truncated for column '{}'",
            column
        ))),
        None => {
            warn!(column, value = %value, "value is not an enum member, stored as ''");
            Ok(Value::Str(String::new()))
        }
    }
}

/// Coerces into a SET column: comma-separated members, deduplicated and
/// put in declaration order. Unknown members are dropped unless `strict`.
pub fn coerce_set(column: &str, value: &Value, members: &[String], strict: bool) -> Result<Value> {
    let text = text_of(value);
    let mut chosen = vec![false; members.len()];
    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match members.iter().position(|m| m.eq_ignore_ascii_case(part)) {
            Some(index) => chosen[index] = true,
            None if strict => {
                return Err(Error::InvalidValue(format!(
                    "Data truncated for column '{}'",
                    column
                )))
            }
            None => warn!(column, member = part, "unknown set member dropped"),
        }
    }
    let joined: Vec<&str> = members
        .iter()
        .zip(chosen)
        .filter(|(_, keep)| *keep)
        .map(|(member, _)| member.as_str())
        .collect();
    Ok(Value::Str(joined.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<String> {
        vec!["small".into(), "medium".into(), "large".into()]
    }

    #[test]
    fn test_truncation() {
        assert_eq!(
            coerce_character("name", &Value::from("abcdef"), 3, false).unwrap(),
            Value::from("abc")
        );
        assert!(matches!(
            coerce_character("name", &Value::from("abcdef"), 3, true),
            Err(Error::DataTooLong(_))
        ));
        assert_eq!(coerce_character("n", &Value::Int(12), 10, true).unwrap(), Value::from("12"));
        assert_eq!(coerce_character("n", &Value::from("héllo"), 5, true).unwrap(), Value::from("héllo"));
    }

    #[test]
    fn test_enum_members() {
        assert_eq!(coerce_enum("size", &Value::from("LARGE"), &members(), true).unwrap(), Value::from("large"));
        assert_eq!(coerce_enum("size", &Value::Int(2), &members(), true).unwrap(), Value::from("medium"));
        assert_eq!(coerce_enum("size", &Value::from("huge"), &members(), false).unwrap(), Value::from(""));
        assert!(coerce_enum("size", &Value::from("huge"), &members(), true).is_err());
    }

    #[test]
    fn test_set_members_are_ordered() {
        assert_eq!(
            coerce_set("sizes", &Value::from("large,small,large"), &members(), true).unwrap(),
            Value::from("small,large")
        );
        assert_eq!(
            coerce_set("sizes", &Value::from("small,huge"), &members(), false).unwrap(),
            Value::from("small")
        );
    }
}
