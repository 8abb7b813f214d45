//! Numeric field extraction from loosely typed JSON payloads.

use serde_json::Value;

use crate::error::MarketDataError;

/// Read a number that may be encoded as a JSON number or a numeric string.
pub fn number(field: &'static str, value: &Value) -> Result<f64, MarketDataError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null => return Err(MarketDataError::MissingField(field)),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(MarketDataError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

/// Like [`number`], but a missing field is `None` rather than an error.
pub fn optional_number(field: &'static str, value: Option<&Value>) -> Result<Option<f64>, MarketDataError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => number(field, v).map(Some),
    }
}

/// Last element of a numeric array field, if present.
pub fn last_of(field: &'static str, value: Option<&Value>) -> Result<Option<f64>, MarketDataError> {
    match value.and_then(Value::as_array).and_then(|items| items.last()) {
        Some(last) => number(field, last).map(Some),
        None => Ok(None),
    }
}
