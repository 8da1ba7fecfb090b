use once_cell::sync::Lazy;
use ordered_float::NotNan;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").expect("number pattern"));

/// Numeric literal as written by the user.
///
/// Integers keep their integral form so that `10` renders back as `10`
/// rather than `10.0`; anything with a fractional part is a `Float`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(NotNan<f64>),
}

impl Number {
    /// Parse a plain decimal literal (`42`, `-3`, `2.5`).
    ///
    /// Exponents, `inf` and `nan` are not numbers here; they stay identifiers.
    pub fn parse(text: &str) -> Option<Self> {
        if !NUMBER_RE.is_match(text) {
            return None;
        }

        if !text.contains('.') {
            if let Ok(value) = text.parse::<i64>() {
                return Some(Number::Int(value));
            }
        }

        let value = text.parse::<f64>().ok()?;
        NotNan::new(value).ok().map(Number::Float)
    }

    /// The value as a row count, if it is a non-negative integer.
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Number::Int(value) => u32::try_from(*value).ok(),
            Number::Float(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Number::Int(value) => serde_json::Value::from(*value),
            Number::Float(value) => serde_json::Number::from_f64(value.into_inner())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{}", value),
            Number::Float(value) => write!(f, "{}", value.into_inner()),
        }
    }
}

impl fmt::Debug for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(_) => write!(f, "Int({})", self),
            Number::Float(_) => write!(f, "Float({})", self),
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Number(Number),
    Text(String),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// SQL literal form: numbers bare, text single-quoted with `'` doubled.
    pub fn to_sql(&self) -> String {
        match self {
            Value::Number(number) => number.to_string(),
            Value::Text(text) => format!("'{}'", text.replace('\'', "''")),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(number) => number.to_json(),
            Value::Text(text) => serde_json::Value::String(text.clone()),
        }
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ir::{Number, Value};

    #[test]
    pub fn test_parse_int() {
        assert_eq!(Number::parse("42"), Some(Number::Int(42)));
        assert_eq!(Number::parse("-3"), Some(Number::Int(-3)));
    }

    #[test]
    pub fn test_parse_float() {
        let number = Number::parse("2.5").expect("float");
        assert_eq!(number.to_string(), "2.5");
        assert!(number.as_count().is_none());
    }

    #[test]
    pub fn test_parse_rejects_words() {
        assert!(Number::parse("inf").is_none());
        assert!(Number::parse("nan").is_none());
        assert!(Number::parse("1e5").is_none());
        assert!(Number::parse("5th").is_none());
        assert!(Number::parse("").is_none());
    }

    #[test]
    pub fn test_as_count() {
        assert_eq!(Number::Int(5).as_count(), Some(5));
        assert_eq!(Number::Int(-1).as_count(), None);
    }

    #[test]
    pub fn test_value_sql_quoting() {
        assert_eq!(Value::text("HR").to_sql(), "'HR'");
        assert_eq!(Value::text("O'Brien").to_sql(), "'O''Brien'");
        assert_eq!(Value::Number(Number::Int(10)).to_sql(), "10");
    }

    #[test]
    pub fn test_value_json() {
        assert_eq!(Value::Number(Number::Int(10)).to_json(), json!(10));
        assert_eq!(Value::Number(Number::parse("1.5").unwrap()).to_json(), json!(1.5));
        assert_eq!(Value::text("HR").to_json(), json!("HR"));
    }
}
