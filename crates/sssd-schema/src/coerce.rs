//! Reconciling raw values with declared option types.
//!
//! [`coerce`] is total over [`Value`]: it either returns the canonical value
//! for the option's declared type or an [`CoercionError::InvalidValueType`].
//! Canonical values never contain [`Value::Float`], and coercing a canonical
//! value again returns it unchanged. Their rendered text is always accepted
//! by [`sssd_ini::check_value`], and no list element contains a comma.

use crate::error::CoercionError;
use crate::types::{OptionSpec, OptionType, ScalarType};
use crate::value::Value;

/// Coerce `value` to the type declared by `spec`.
pub fn coerce(spec: &OptionSpec, value: &Value) -> Result<Value, CoercionError> {
    let coerced = match spec.option_type {
        OptionType::List(elem) => coerce_list(elem, value),
        OptionType::Integer => coerce_scalar(ScalarType::Integer, value),
        OptionType::String => coerce_scalar(ScalarType::String, value),
        OptionType::Boolean => coerce_scalar(ScalarType::Boolean, value),
    };
    coerced
        .filter(|canonical| sssd_ini::check_value(&render(canonical)).is_ok())
        .ok_or_else(|| CoercionError::InvalidValueType {
            option: spec.name.clone(),
            expected: spec.option_type,
            value: value.to_string(),
        })
}

/// Coerce option text as it appears in a document.
pub fn parse_text(spec: &OptionSpec, text: &str) -> Result<Value, CoercionError> {
    coerce(spec, &Value::String(text.to_string()))
}

/// Text written into a document for a canonical value.
pub fn render(value: &Value) -> String {
    value.to_string()
}

fn coerce_list(elem: ScalarType, value: &Value) -> Option<Value> {
    match value {
        Value::List(items) => items
            .iter()
            .map(|item| coerce_scalar(elem, item).filter(|v| !v.to_string().contains(',')))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| coerce_scalar(elem, &Value::String(part.to_string())))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        _ => None,
    }
}

fn coerce_scalar(target: ScalarType, value: &Value) -> Option<Value> {
    match target {
        ScalarType::Integer => coerce_integer(value).map(Value::Integer),
        ScalarType::Boolean => coerce_bool(value).map(Value::Boolean),
        ScalarType::String => match value {
            Value::List(_) => None,
            other => Some(Value::String(other.to_string())),
        },
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(n) => Some(*n),
        Value::String(text) => text.trim().parse().ok(),
        Value::Float(x) => {
            let truncated = x.trunc();
            // i64::MAX is not exactly representable; the upper bound is exclusive
            if truncated.is_finite() && truncated >= -(2f64.powi(63)) && truncated < 2f64.powi(63) {
                Some(truncated as i64)
            } else {
                None
            }
        }
        Value::Boolean(_) | Value::List(_) => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        Value::String(text) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") {
                Some(true)
            } else if text.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}
