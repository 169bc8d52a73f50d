//! Raw JSON field coercion shared by every normalizer.
//!
//! Binance sends prices and quantities as decimal strings and times as
//! millisecond epochs. Each helper takes the canonical column name and the row
//! index so a failure can be reported as a [`SchemaViolation`].

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::SchemaViolation;

/// Float from a JSON number or numeric string. Non-finite values are rejected.
pub fn float(
    value: Option<&Value>,
    field: &'static str,
    row: usize,
) -> Result<f64, SchemaViolation> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(SchemaViolation::new(row, field, "missing")),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => return Err(mismatch(row, field, "number", other)),
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(SchemaViolation::new(
            row,
            field,
            format!("not a finite number: {}", describe(value)),
        )),
    }
}

/// Signed integer from a JSON integer or integer string.
pub fn integer(
    value: Option<&Value>,
    field: &'static str,
    row: usize,
) -> Result<i64, SchemaViolation> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(SchemaViolation::new(row, field, "missing")),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(other) => return Err(mismatch(row, field, "integer", other)),
    };

    parsed.ok_or_else(|| {
        SchemaViolation::new(row, field, format!("not an integer: {}", describe(value)))
    })
}

pub fn boolean(
    value: Option<&Value>,
    field: &'static str,
    row: usize,
) -> Result<bool, SchemaViolation> {
    match value {
        Some(Value::Bool(b)) => Ok(*b),
        None | Some(Value::Null) => Err(SchemaViolation::new(row, field, "missing")),
        Some(other) => Err(mismatch(row, field, "boolean", other)),
    }
}

pub fn text<'a>(
    value: Option<&'a Value>,
    field: &'static str,
    row: usize,
) -> Result<&'a str, SchemaViolation> {
    match value {
        Some(Value::String(s)) => Ok(s.as_str()),
        None | Some(Value::Null) => Err(SchemaViolation::new(row, field, "missing")),
        Some(other) => Err(mismatch(row, field, "string", other)),
    }
}

/// UTC instant from a millisecond epoch (number or string).
pub fn instant_ms(
    value: Option<&Value>,
    field: &'static str,
    row: usize,
) -> Result<DateTime<Utc>, SchemaViolation> {
    let ms = integer(value, field, row)?;
    from_epoch_ms(ms).ok_or_else(|| {
        SchemaViolation::new(row, field, format!("timestamp out of range: {}", ms))
    })
}

fn mismatch(row: usize, field: &'static str, expected: &str, found: &Value) -> SchemaViolation {
    SchemaViolation::new(row, field, format!("expected {}, found {}", expected, found))
}

pub fn from_epoch_ms(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

pub fn to_epoch_ms(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

/// Truncate a wall-clock reading to millisecond precision, the resolution every
/// stored instant is kept at.
pub fn collection_epoch(now: DateTime<Utc>) -> DateTime<Utc> {
    from_epoch_ms(now.timestamp_millis()).unwrap_or(now)
}

fn describe(value: Option<&Value>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "missing".to_string())
}
