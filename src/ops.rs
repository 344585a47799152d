//! Value transformations shared by the stores.
//!
//! Each function takes the value currently stored under a key and returns the
//! value to write back, so both the fjall-backed table and the in-memory
//! store apply identical rules.

use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::types::{MathOp, ValueType};
use crate::util::{self, ParsedKey};

/// New record data after setting `value` at `parsed`.
///
/// A key without target replaces the data outright; a key with a target
/// writes into the existing data, starting from `{}` for a new record.
pub(crate) fn resolve_set(parsed: &ParsedKey, current: Option<Value>, value: Value) -> Result<Value> {
    if parsed.target.is_none() {
        return Ok(value);
    }
    let data = current.unwrap_or_else(|| Value::Object(Map::new()));
    util::set_data(&parsed.to_string(), data, value)
}

/// Apply `op` with `operand` to the current value. Absent and `null` count as 0.
pub(crate) fn apply_math(
    key: &str,
    current: Option<&Value>,
    op: MathOp,
    operand: f64,
) -> Result<Value> {
    if !operand.is_finite() {
        return Err(Error::InvalidNumber(operand));
    }

    let base = match current {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(other) => {
            return Err(Error::NotANumber {
                key: key.to_string(),
                found: ValueType::of(Some(other)),
            });
        }
    };

    let result = match op {
        MathOp::Add => base + operand,
        MathOp::Subtract => base - operand,
        MathOp::Multiply => base * operand,
        MathOp::Divide | MathOp::Modulo if operand == 0.0 => return Err(Error::DivisionByZero),
        MathOp::Divide => base / operand,
        MathOp::Modulo => base % operand,
    };

    number_value(result)
}

/// JSON number for `n`, stored as an integer when it is whole.
pub(crate) fn number_value(n: f64) -> Result<Value> {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        return Ok(Value::from(n as i64));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or(Error::InvalidNumber(n))
}

/// Append `value` (or each element of an array `value`) to the current array.
pub(crate) fn push_values(key: &str, current: Option<Value>, value: Value) -> Result<Value> {
    let mut items = match current {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::NotAnArray(key.to_string())),
    };
    match value {
        Value::Array(values) => items.extend(values),
        value => items.push(value),
    }
    Ok(Value::Array(items))
}

/// Drop every element equal to `value` (or to any element of an array `value`).
pub(crate) fn pull_values(key: &str, current: Value, value: &Value) -> Result<Value> {
    let Value::Array(mut items) = current else {
        return Err(Error::NotAnArray(key.to_string()));
    };
    match value {
        Value::Array(values) => items.retain(|item| !values.contains(item)),
        value => items.retain(|item| item != value),
    }
    Ok(Value::Array(items))
}
