//! Document and value helpers.

use serde_json::{Map, Number, Value};

/// The whole persisted mapping. Keys keep insertion order.
pub type Document = Map<String, Value>;

/// A `(key, value)` pair taken from a [`Document`].
pub type Entry = (String, Value);

// 2^53: beyond this an f64 no longer holds every integer exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy. Arrays and
/// objects are truthy even when empty.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Equality that compares numbers by amount, so `5` matches `5.0`. Arrays
/// and objects compare element by element; object key order is ignored.
#[must_use]
pub fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| json_eq(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| json_eq(x, y)))
        }
        _ => a == b,
    }
}

/// Turn an arithmetic result back into JSON. Whole numbers in the safe
/// integer range are stored as integers so `5` stays `5` rather than `5.0`.
/// JSON has no encoding for infinities or NaN, so those become `null`.
#[must_use]
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}
