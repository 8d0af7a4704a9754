//! Date and time functions
//!
//! Dates travel as strings in MySQL's canonical shapes. The current time is
//! the statement time fixed in the context, so every NOW() in one statement
//! agrees.

use super::{FunctionRegistry, Scalar};
use crate::coercion::temporal::{self, DATETIME_FORMAT, DATE_FORMAT, TIME_FORMAT};
use crate::error::Result;
use crate::parsing::ast::IntervalUnit;
use crate::types::context::ExecutionContext;
use chrono::{Datelike, Local, Months, NaiveDateTime, TimeDelta, TimeZone};
use shadow_value::Value;

fn datetime_arg(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Null => None,
        Value::Float(f) if f.fract() == 0.0 => temporal::parse_datetime(&(*f as i64).to_string()),
        other => temporal::parse_datetime(&other.as_text()?),
    }
}

/// Whether a value spells only a date, so date arithmetic can keep the
/// result date-only
fn is_date_only(value: &Value) -> bool {
    value.as_text().is_some_and(|s| {
        let s = s.trim();
        s.len() <= 10 && !s.contains(':')
    })
}

fn now(_: &[Value], context: &ExecutionContext) -> Result<Value> {
    Ok(Value::Str(context.statement_time.format(DATETIME_FORMAT).to_string()))
}

fn curdate(_: &[Value], context: &ExecutionContext) -> Result<Value> {
    Ok(Value::Str(context.statement_time.format(DATE_FORMAT).to_string()))
}

fn curtime(_: &[Value], context: &ExecutionContext) -> Result<Value> {
    Ok(Value::Str(context.statement_time.format(TIME_FORMAT).to_string()))
}

fn date(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(datetime_arg(&args[0]).map_or(Value::Null, |dt| {
        Value::Str(dt.format(DATE_FORMAT).to_string())
    }))
}

/// Seconds since the epoch, reading naive times in the local zone
fn unix_timestamp(args: &[Value], context: &ExecutionContext) -> Result<Value> {
    let moment = match args.first() {
        Some(value) => datetime_arg(value),
        None => Some(context.statement_time),
    };
    Ok(moment
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
        .map_or(Value::Null, |dt| Value::Int(dt.timestamp())))
}

fn from_unixtime(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    let Some(seconds) = args[0].as_i64() else {
        return Ok(Value::Null);
    };
    let Some(moment) = Local.timestamp_opt(seconds, 0).single() else {
        return Ok(Value::Null);
    };
    let moment = moment.naive_local();
    match args.get(1) {
        Some(format) => Ok(format
            .as_text()
            .map_or(Value::Null, |f| Value::Str(format_mysql(&moment, &f)))),
        None => Ok(Value::Str(moment.format(DATETIME_FORMAT).to_string())),
    }
}

/// Render `moment` with MySQL's DATE_FORMAT specifiers
pub fn format_mysql(moment: &NaiveDateTime, format: &str) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let Some(spec) = chars.next() else {
            out.push('%');
            break;
        };
        let chrono_spec = match spec {
            'Y' => "%Y",
            'y' => "%y",
            'm' => "%m",
            'c' => "%-m",
            'd' => "%d",
            'e' => "%-d",
            'H' => "%H",
            'k' => "%-H",
            'h' | 'I' => "%I",
            'l' => "%-I",
            'i' => "%M",
            's' | 'S' => "%S",
            'f' => "%6f",
            'p' => "%p",
            'W' => "%A",
            'a' => "%a",
            'M' => "%B",
            'b' => "%b",
            'j' => "%j",
            'T' => "%H:%M:%S",
            'r' => "%I:%M:%S %p",
            'w' => "%w",
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(&moment.format(chrono_spec).to_string());
    }
    out
}

fn date_format(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    match (datetime_arg(&args[0]), args[1].as_text()) {
        (Some(moment), Some(format)) => Ok(Value::Str(format_mysql(&moment, &format))),
        _ => Ok(Value::Null),
    }
}

fn datediff(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    match (datetime_arg(&args[0]), datetime_arg(&args[1])) {
        (Some(a), Some(b)) => Ok(Value::Int((a.date() - b.date()).num_days())),
        _ => Ok(Value::Null),
    }
}

/// Shift a date by `amount` units, `subtract` flipping the direction.
/// Month arithmetic clamps to the last day of the month. Date-only input
/// stays date-only for whole-day units.
pub fn add_interval(value: &Value, amount: &Value, unit: IntervalUnit, subtract: bool) -> Value {
    let (Some(moment), Some(amount)) = (datetime_arg(value), amount.as_i64()) else {
        return Value::Null;
    };
    let amount = if subtract { -amount } else { amount };
    let shifted = match unit {
        IntervalUnit::Microsecond => moment.checked_add_signed(TimeDelta::microseconds(amount)),
        IntervalUnit::Second => shift(moment, TimeDelta::try_seconds(amount)),
        IntervalUnit::Minute => shift(moment, TimeDelta::try_minutes(amount)),
        IntervalUnit::Hour => shift(moment, TimeDelta::try_hours(amount)),
        IntervalUnit::Day => shift(moment, TimeDelta::try_days(amount)),
        IntervalUnit::Week => shift(moment, TimeDelta::try_weeks(amount)),
        IntervalUnit::Month => add_months(moment, amount),
        IntervalUnit::Quarter => add_months(moment, amount.saturating_mul(3)),
        IntervalUnit::Year => add_months(moment, amount.saturating_mul(12)),
    };
    let Some(shifted) = shifted else {
        return Value::Null;
    };
    let whole_days = matches!(
        unit,
        IntervalUnit::Day
            | IntervalUnit::Week
            | IntervalUnit::Month
            | IntervalUnit::Quarter
            | IntervalUnit::Year
    );
    let format = if whole_days && is_date_only(value) {
        DATE_FORMAT
    } else {
        DATETIME_FORMAT
    };
    Value::Str(shifted.format(format).to_string())
}

fn shift(moment: NaiveDateTime, delta: Option<TimeDelta>) -> Option<NaiveDateTime> {
    moment.checked_add_signed(delta?)
}

fn add_months(moment: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        moment.checked_add_months(magnitude)
    } else {
        moment.checked_sub_months(magnitude)
    }
}

/// DATE_ADD(d, n) without INTERVAL counts days
fn date_add(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(add_interval(&args[0], &args[1], IntervalUnit::Day, false))
}

fn date_sub(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(add_interval(&args[0], &args[1], IntervalUnit::Day, true))
}

fn year(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(datetime_arg(&args[0]).map_or(Value::Null, |dt| Value::Int(dt.year() as i64)))
}

fn month(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(datetime_arg(&args[0]).map_or(Value::Null, |dt| Value::Int(dt.month() as i64)))
}

fn day(args: &[Value], _: &ExecutionContext) -> Result<Value> {
    Ok(datetime_arg(&args[0]).map_or(Value::Null, |dt| Value::Int(dt.day() as i64)))
}

pub fn register(registry: &mut FunctionRegistry) {
    registry.register(Scalar::boxed("NOW", 0, Some(0), now));
    registry.alias("CURRENT_TIMESTAMP", "NOW");
    registry.alias("SYSDATE", "NOW");
    registry.register(Scalar::boxed("CURDATE", 0, Some(0), curdate));
    registry.alias("CURRENT_DATE", "CURDATE");
    registry.register(Scalar::boxed("CURTIME", 0, Some(0), curtime));
    registry.alias("CURRENT_TIME", "CURTIME");
    registry.register(Scalar::boxed("DATE", 1, Some(1), date));
    registry.register(Scalar::boxed("UNIX_TIMESTAMP", 0, Some(1), unix_timestamp));
    registry.register(Scalar::boxed("FROM_UNIXTIME", 1, Some(2), from_unixtime));
    registry.register(Scalar::boxed("DATE_FORMAT", 2, Some(2), date_format));
    registry.register(Scalar::boxed("DATEDIFF", 2, Some(2), datediff));
    registry.register(Scalar::boxed("DATE_ADD", 2, Some(2), date_add));
    registry.alias("ADDDATE", "DATE_ADD");
    registry.register(Scalar::boxed("DATE_SUB", 2, Some(2), date_sub));
    registry.alias("SUBDATE", "DATE_SUB");
    registry.register(Scalar::boxed("YEAR", 1, Some(1), year));
    registry.register(Scalar::boxed("MONTH", 1, Some(1), month));
    registry.register(Scalar::boxed("DAY", 1, Some(1), day));
    registry.alias("DAYOFMONTH", "DAY");
}
