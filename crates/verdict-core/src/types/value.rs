//! Runtime value types for FEEL expressions
//!
//! `FeelValue` is the single value type flowing through the expression
//! evaluator, the condition evaluator and the decision graph. Lists and
//! contexts are shared behind `Arc` and never mutated after construction, so
//! cloning a value is cheap and can never alias caller memory.

use super::number::FeelNumber;
use super::temporal::{FeelDate, FeelDuration, FeelTime};
use crate::ast::Expr;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered FEEL context (string-keyed map)
pub type FeelContext = IndexMap<String, FeelValue>;

/// User-defined FEEL function (`function(a, b) a + b`)
#[derive(Debug, Clone, PartialEq)]
pub struct FeelFunction {
    pub params: Vec<String>,
    pub body: Expr,
    /// Bindings visible where the function was defined
    pub captured: FeelContext,
}

/// Runtime value type
#[derive(Debug, Clone, Default)]
pub enum FeelValue {
    #[default]
    Null,
    Boolean(bool),
    Number(FeelNumber),
    String(String),
    Date(FeelDate),
    Time(FeelTime),
    Duration(FeelDuration),
    List(Arc<Vec<FeelValue>>),
    Context(Arc<FeelContext>),
    Function(Arc<FeelFunction>),
}

impl FeelValue {
    pub fn list(items: Vec<FeelValue>) -> Self {
        FeelValue::List(Arc::new(items))
    }

    pub fn context(entries: FeelContext) -> Self {
        FeelValue::Context(Arc::new(entries))
    }

    pub fn string(s: impl Into<String>) -> Self {
        FeelValue::String(s.into())
    }

    /// Float-backed number; NaN and infinities become null
    pub fn from_f64(value: f64) -> Self {
        FeelNumber::float(value).map_or(FeelValue::Null, FeelValue::Number)
    }

    /// FEEL type name, as used by `instance of` and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FeelValue::Null => "null",
            FeelValue::Boolean(_) => "boolean",
            FeelValue::Number(_) => "number",
            FeelValue::String(_) => "string",
            FeelValue::Date(_) => "date",
            FeelValue::Time(_) => "time",
            FeelValue::Duration(_) => "duration",
            FeelValue::List(_) => "list",
            FeelValue::Context(_) => "context",
            FeelValue::Function(_) => "function",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FeelValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FeelValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&FeelNumber> {
        match self {
            FeelValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(FeelNumber::to_f64)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeelValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FeelValue]> {
        match self {
            FeelValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_context(&self) -> Option<&FeelContext> {
        match self {
            FeelValue::Context(map) => Some(map),
            _ => None,
        }
    }

    /// Lookup of a context entry; `None` for missing keys and non-contexts
    pub fn get(&self, key: &str) -> Option<&FeelValue> {
        self.as_context().and_then(|map| map.get(key))
    }

    /// FEEL equality.
    ///
    /// Returns `None` when the two values are of incomparable types.
    pub fn feel_eq(&self, other: &FeelValue) -> Option<bool> {
        match (self, other) {
            (FeelValue::Null, FeelValue::Null) => Some(true),
            (FeelValue::Null, _) | (_, FeelValue::Null) => Some(false),
            (FeelValue::Boolean(a), FeelValue::Boolean(b)) => Some(a == b),
            (FeelValue::Number(a), FeelValue::Number(b)) => Some(a == b),
            (FeelValue::String(a), FeelValue::String(b)) => Some(a == b),
            (FeelValue::Date(a), FeelValue::Date(b)) => Some(a == b),
            (FeelValue::Time(a), FeelValue::Time(b)) => Some(a == b),
            (FeelValue::Duration(a), FeelValue::Duration(b)) => Some(a == b),
            (FeelValue::List(a), FeelValue::List(b)) => Some(
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| x.feel_eq(y) == Some(true)),
            ),
            (FeelValue::Context(a), FeelValue::Context(b)) => Some(
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.get(k).map_or(false, |other| v.feel_eq(other) == Some(true))
                    }),
            ),
            (FeelValue::Function(a), FeelValue::Function(b)) => Some(Arc::ptr_eq(a, b)),
            _ => None,
        }
    }

    /// FEEL ordering for numbers, strings, dates, times and durations
    pub fn feel_cmp(&self, other: &FeelValue) -> Option<Ordering> {
        match (self, other) {
            (FeelValue::Number(a), FeelValue::Number(b)) => a.partial_cmp(b),
            (FeelValue::String(a), FeelValue::String(b)) => Some(a.cmp(b)),
            (FeelValue::Date(a), FeelValue::Date(b)) => Some(a.cmp(b)),
            (FeelValue::Time(a), FeelValue::Time(b)) => Some(a.cmp(b)),
            (FeelValue::Duration(a), FeelValue::Duration(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// Deep copy of untrusted JSON input.
    ///
    /// Numbers keep their source decimal text when it is representable.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => FeelValue::Null,
            serde_json::Value::Bool(b) => FeelValue::Boolean(*b),
            serde_json::Value::Number(n) => {
                let text = n.to_string();
                match FeelNumber::parse_literal(&text) {
                    Ok(number) => FeelValue::Number(number),
                    Err(_) => n.as_f64().map_or(FeelValue::Null, FeelValue::from_f64),
                }
            }
            serde_json::Value::String(s) => FeelValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                FeelValue::list(items.iter().map(FeelValue::from_json).collect())
            }
            serde_json::Value::Object(map) => FeelValue::context(
                map.iter()
                    .map(|(k, v)| (k.clone(), FeelValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// JSON rendering; temporal values become their ISO strings
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FeelValue::Null | FeelValue::Function(_) => serde_json::Value::Null,
            FeelValue::Boolean(b) => serde_json::Value::Bool(*b),
            FeelValue::Number(n) => match n.to_i64() {
                Some(i) => serde_json::Value::from(i),
                None => serde_json::Number::from_f64(n.to_f64())
                    .map_or(serde_json::Value::Null, serde_json::Value::Number),
            },
            FeelValue::String(s) => serde_json::Value::String(s.clone()),
            FeelValue::Date(d) => serde_json::Value::String(d.to_string()),
            FeelValue::Time(t) => serde_json::Value::String(t.to_string()),
            FeelValue::Duration(d) => serde_json::Value::String(d.to_string()),
            FeelValue::List(items) => {
                serde_json::Value::Array(items.iter().map(FeelValue::to_json).collect())
            }
            FeelValue::Context(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl PartialEq for FeelValue {
    fn eq(&self, other: &Self) -> bool {
        self.feel_eq(other) == Some(true)
    }
}

impl From<bool> for FeelValue {
    fn from(b: bool) -> Self {
        FeelValue::Boolean(b)
    }
}

impl From<i64> for FeelValue {
    fn from(n: i64) -> Self {
        FeelValue::Number(FeelNumber::from_i64(n))
    }
}

impl From<&str> for FeelValue {
    fn from(s: &str) -> Self {
        FeelValue::String(s.to_string())
    }
}

impl From<String> for FeelValue {
    fn from(s: String) -> Self {
        FeelValue::String(s)
    }
}

impl From<serde_json::Value> for FeelValue {
    fn from(value: serde_json::Value) -> Self {
        FeelValue::from_json(&value)
    }
}

impl Serialize for FeelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FeelValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(|v| FeelValue::from_json(&v))
    }
}

/// Prints the value as a FEEL literal that evaluates back to an equal value
impl fmt::Display for FeelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeelValue::Null => write!(f, "null"),
            FeelValue::Boolean(b) => write!(f, "{}", b),
            FeelValue::Number(n) => write!(f, "{}", n),
            FeelValue::String(s) => write_quoted(f, s),
            FeelValue::Date(d) => write!(f, "date(\"{}\")", d),
            FeelValue::Time(t) => write!(f, "time(\"{}\")", t),
            FeelValue::Duration(d) => write!(f, "duration(\"{}\")", d),
            FeelValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            FeelValue::Context(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_quoted(f, key)?;
                    write!(f, ": {}", value)?;
                }
                write!(f, "}}")
            }
            FeelValue::Function(func) => write!(f, "function({})", func.params.join(", ")),
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\r' => write!(f, "\\r")?,
            other => write!(f, "{}", other)?,
        }
    }
    write!(f, "\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_null() {
        assert_eq!(FeelValue::Null, FeelValue::Null);
        assert_eq!(FeelValue::Null.feel_eq(&FeelValue::from(1_i64)), Some(false));
    }

    #[test]
    fn test_incomparable_types() {
        let s = FeelValue::from("1");
        let n = FeelValue::from(1_i64);
        assert_eq!(s.feel_eq(&n), None);
        assert_ne!(s, n);
        assert_eq!(s.feel_cmp(&n), None);
    }

    #[test]
    fn test_from_json_deep_copy() {
        let raw = json!({"user": {"age": 42, "tags": ["a", "b"]}, "score": 1.50});
        let value = FeelValue::from_json(&raw);
        let user = value.get("user").unwrap();
        assert_eq!(user.get("age"), Some(&FeelValue::from(42_i64)));
        assert_eq!(user.get("tags").unwrap().as_list().unwrap().len(), 2);
        assert_eq!(value.get("score").unwrap().to_string(), "1.5");
    }

    #[test]
    fn test_display_literals() {
        let value = FeelValue::from_json(&json!({"a": [1, "x\"y", null, true]}));
        assert_eq!(value.to_string(), r#"{"a": [1, "x\"y", null, true]}"#);
        let date = FeelValue::Date(FeelDate::parse("2024-05-01").unwrap());
        assert_eq!(date.to_string(), "date(\"2024-05-01\")");
    }

    #[test]
    fn test_list_equality() {
        let a = FeelValue::list(vec![FeelValue::from(1_i64), FeelValue::from("x")]);
        let b = FeelValue::list(vec![FeelValue::from(1_i64), FeelValue::from("x")]);
        let c = FeelValue::list(vec![FeelValue::from(1_i64)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serde_json_roundtrip() {
        let value = FeelValue::from_json(&json!({"count": 42, "active": true}));
        let text = serde_json::to_string(&value).unwrap();
        let back: FeelValue = serde_json::from_str(&text).unwrap();
        assert_eq!(value, back);
    }
}
