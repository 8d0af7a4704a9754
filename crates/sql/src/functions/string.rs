//! String functions
//!
//! Positions and lengths count characters, except LENGTH which counts
//! bytes as MySQL does.

use super::{FunctionRegistry, Scalar};
use crate::error::Result;
use crate::types::context::ExecutionContext;
use shadow_value::Value;

/// Text of every argument, or None when any is NULL
fn texts(args: &[Value]) -> Option<Vec<String>> {
    args.iter().map(Value::as_text).collect()
}

fn int_arg(value: &Value) -> Option<i64> {
    value.as_i64()
}

fn concat(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(texts(args).map_or(Value::Null, |parts| Value::Str(parts.concat())))
}

/// CONCAT_WS skips NULL arguments after the separator
fn concat_ws(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    let Some(separator) = args[0].as_text() else {
        return Ok(Value::Null);
    };
    let parts: Vec<String> = args[1..].iter().filter_map(Value::as_text).collect();
    Ok(Value::Str(parts.join(&separator)))
}

fn upper(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0].as_text().map_or(Value::Null, |s| Value::Str(s.to_uppercase())))
}

fn lower(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0].as_text().map_or(Value::Null, |s| Value::Str(s.to_lowercase())))
}

fn length(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0].as_text().map_or(Value::Null, |s| Value::Int(s.len() as i64)))
}

fn char_length(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0]
        .as_text()
        .map_or(Value::Null, |s| Value::Int(s.chars().count() as i64)))
}

/// SUBSTRING(s, pos[, len]): 1-based, negative positions count from the
/// end, position 0 yields ''
fn substring(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    let Some(text) = args[0].as_text() else {
        return Ok(Value::Null);
    };
    let Some(pos) = int_arg(&args[1]) else {
        return Ok(Value::Null);
    };
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;
    let start = match pos {
        0 => return Ok(Value::from("")),
        p if p > 0 => p - 1,
        p => len + p,
    };
    if start < 0 || start >= len {
        return Ok(Value::from(""));
    }
    let take = match args.get(2) {
        Some(count) => match int_arg(count) {
            Some(n) if n > 0 => n,
            Some(_) => return Ok(Value::from("")),
            None => return Ok(Value::Null),
        },
        None => len,
    };
    let end = (start + take).min(len);
    Ok(Value::Str(chars[start as usize..end as usize].iter().collect()))
}

fn left(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    match (args[0].as_text(), int_arg(&args[1])) {
        (Some(s), Some(n)) => Ok(Value::Str(s.chars().take(n.max(0) as usize).collect())),
        _ => Ok(Value::Null),
    }
}

fn right(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    match (args[0].as_text(), int_arg(&args[1])) {
        (Some(s), Some(n)) => {
            let count = s.chars().count();
            let skip = count.saturating_sub(n.max(0) as usize);
            Ok(Value::Str(s.chars().skip(skip).collect()))
        }
        _ => Ok(Value::Null),
    }
}

fn trim(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0].as_text().map_or(Value::Null, |s| Value::from(s.trim_matches(' '))))
}

fn ltrim(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0]
        .as_text()
        .map_or(Value::Null, |s| Value::from(s.trim_start_matches(' '))))
}

fn rtrim(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(args[0]
        .as_text()
        .map_or(Value::Null, |s| Value::from(s.trim_end_matches(' '))))
}

fn replace(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(match texts(args).as_deref() {
        Some([s, from, to]) if !from.is_empty() => Value::Str(s.replace(from.as_str(), to)),
        Some([s, _, _]) => Value::Str(s.clone()),
        _ => Value::Null,
    })
}

/// FIELD(x, a, b, ...): 1-based position of x among the rest, 0 if absent
fn field(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    let Some(needle) = args[0].as_text() else {
        return Ok(Value::Int(0));
    };
    let position = args[1..]
        .iter()
        .position(|v| v.as_text().is_some_and(|t| t.eq_ignore_ascii_case(&needle)));
    Ok(Value::Int(position.map_or(0, |p| p as i64 + 1)))
}

fn find_in_set(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    match (args[0].as_text(), args[1].as_text()) {
        (Some(needle), Some(list)) => {
            let position = list
                .split(',')
                .position(|member| member.eq_ignore_ascii_case(&needle));
            Ok(Value::Int(position.map_or(0, |p| p as i64 + 1)))
        }
        _ => Ok(Value::Null),
    }
}

/// LPAD/RPAD: pad or cut `s` to exactly `len` characters
fn pad(args: &[Value], at_start: bool) -> Value {
    let (Some(s), Some(len), Some(filler)) = (args[0].as_text(), int_arg(&args[1]), args[2].as_text())
    else {
        return Value::Null;
    };
    if len < 0 {
        return Value::Null;
    }
    let len = len as usize;
    let count = s.chars().count();
    if count >= len {
        return Value::Str(s.chars().take(len).collect());
    }
    if filler.is_empty() {
        return Value::Null;
    }
    let padding: String = filler.chars().cycle().take(len - count).collect();
    Value::Str(if at_start { padding + &s } else { s + &padding })
}

fn lpad(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(pad(args, true))
}

fn rpad(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(pad(args, false))
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Scalar::boxed("CONCAT", 1, None, concat));
    registry.register(Scalar::boxed("CONCAT_WS", 2, None, concat_ws));
    registry.register(Scalar::boxed("UPPER", 1, Some(1), upper));
    registry.alias("UCASE", "UPPER");
    registry.register(Scalar::boxed("LOWER", 1, Some(1), lower));
    registry.alias("LCASE", "LOWER");
    registry.register(Scalar::boxed("LENGTH", 1, Some(1), length));
    registry.register(Scalar::boxed("CHAR_LENGTH", 1, Some(1), char_length));
    registry.alias("CHARACTER_LENGTH", "CHAR_LENGTH");
    registry.register(Scalar::boxed("SUBSTRING", 2, Some(3), substring));
    registry.alias("SUBSTR", "SUBSTRING");
    registry.register(Scalar::boxed("LEFT", 2, Some(2), left));
    registry.register(Scalar::boxed("RIGHT", 2, Some(2), right));
    registry.register(Scalar::boxed("TRIM", 1, Some(1), trim));
    registry.register(Scalar::boxed("LTRIM", 1, Some(1), ltrim));
    registry.register(Scalar::boxed("RTRIM", 1, Some(1), rtrim));
    registry.register(Scalar::boxed("REPLACE", 3, Some(3), replace));
    registry.register(Scalar::boxed("FIELD", 2, None, field));
    registry.register(Scalar::boxed("FIND_IN_SET", 2, Some(2), find_in_set));
    registry.register(Scalar::boxed("LPAD", 3, Some(3), lpad));
    registry.register(Scalar::boxed("RPAD", 3, Some(3), rpad));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(f: fn(&[Value], &ExecutionContext) -> Result<Value>, args: &[Value]) -> Value {
        f(args, &ExecutionContext::default()).unwrap()
    }

    #[test]
    fn test_concat() {
        assert_eq!(call(concat, &[Value::from("a"), Value::Int(1)]), Value::from("a1"));
        assert_eq!(call(concat, &[Value::from("a"), Value::Null]), Value::Null);
        assert_eq!(
            call(concat_ws, &[Value::from("-"), Value::from("a"), Value::Null, Value::from("b")]),
            Value::from("a-b")
        );
    }

    #[test]
    fn test_substring() {
        let s = Value::from("Quadratically");
        assert_eq!(call(substring, &[s.clone(), Value::Int(5)]), Value::from("ratically"));
        assert_eq!(call(substring, &[s.clone(), Value::Int(5), Value::Int(6)]), Value::from("ratica"));
        assert_eq!(call(substring, &[s.clone(), Value::Int(-3)]), Value::from("lly"));
        assert_eq!(call(substring, &[s, Value::Int(0)]), Value::from(""));
    }

    #[test]
    fn test_lengths_and_case() {
        assert_eq!(call(length, &[Value::from("héllo")]), Value::Int(6));
        assert_eq!(call(char_length, &[Value::from("héllo")]), Value::Int(5));
        assert_eq!(call(upper, &[Value::from("abc")]), Value::from("ABC"));
        assert_eq!(call(left, &[Value::from("abcdef"), Value::Int(2)]), Value::from("ab"));
        assert_eq!(call(right, &[Value::from("abcdef"), Value::Int(2)]), Value::from("ef"));
    }

    #[test]
    fn test_lookup_and_padding() {
        assert_eq!(
            call(field, &[Value::from("b"), Value::from("a"), Value::from("b")]),
            Value::Int(2)
        );
        assert_eq!(call(find_in_set, &[Value::from("c"), Value::from("a,b,c")]), Value::Int(3));
        assert_eq!(
            call(lpad, &[Value::from("5"), Value::Int(3), Value::from("0")]),
            Value::from("005")
        );
        assert_eq!(
            call(rpad, &[Value::from("abc"), Value::Int(2), Value::from("x")]),
            Value::from("ab")
        );
        assert_eq!(
            call(replace, &[Value::from("a.b.c"), Value::from("."), Value::from("/")]),
            Value::from("a/b/c")
        );
    }
}
