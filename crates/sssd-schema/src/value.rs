//! Typed option values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed option value.
///
/// Values are produced by coercion against an [`crate::OptionSpec`]; the
/// variant then matches the declared type. `Float` only exists as coercion
/// input for integer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::List(_) => "list",
        }
    }
}

/// Renders the value the way it is written to a configuration file.
///
/// Booleans are `true`/`false`, lists are joined with `", "`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from("LOCAL").to_string(), "LOCAL");
        assert_eq!(Value::from(vec!["nss", "pam"]).to_string(), "nss, pam");
        assert_eq!(Value::List(vec![]).to_string(), "");
    }

    #[test]
    fn test_accessors() {
        let v = Value::from(vec!["a"]);
        assert_eq!(v.as_list().map(<[Value]>::len), Some(1));
        assert_eq!(v.as_str(), None);
        assert_eq!(Value::from(7).as_integer(), Some(7));
        assert_eq!(Value::from(false).as_bool(), Some(false));
    }

    #[test]
    fn test_untagged_json() {
        let v: Value = serde_json::from_str(r#"["nss", "pam"]"#).unwrap();
        assert_eq!(v, Value::from(vec!["nss", "pam"]));
        let v: Value = serde_json::from_str("3").unwrap();
        assert_eq!(v, Value::Integer(3));
        assert_eq!(serde_json::to_string(&Value::from(true)).unwrap(), "true");
    }
}
