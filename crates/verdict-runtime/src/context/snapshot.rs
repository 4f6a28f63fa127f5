//! Immutable context snapshot

use super::field_lookup::{get_nested_value, split_path};
use crate::error::{Result, RuntimeError};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use verdict_core::{FeelContext, FeelValue};

/// Read-only input data for one decision request.
///
/// Input is deep-copied into FEEL values on construction, so later changes
/// to the caller's data are never observed. There are no mutators: binding a
/// value produces a new snapshot and leaves this one untouched.
#[derive(Debug, Clone, Default)]
pub struct Context {
    values: Arc<FeelContext>,
}

impl Context {
    pub fn new(values: FeelContext) -> Self {
        Self {
            values: Arc::new(values),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a JSON object (or `null`, giving an empty context)
    pub fn from_json(input: &serde_json::Value) -> Result<Self> {
        match FeelValue::from_json(input) {
            FeelValue::Context(map) => Ok(Self { values: map }),
            FeelValue::Null => Ok(Self::empty()),
            other => Err(RuntimeError::InvalidContext(format!(
                "expected an object, got {}",
                other.type_name()
            ))),
        }
    }

    /// Build from key/value pairs
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, FeelValue)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Top-level entry
    pub fn get(&self, name: &str) -> Option<&FeelValue> {
        self.values.get(name)
    }

    /// Resolve a dotted path; missing segments and non-context intermediates yield null
    pub fn lookup(&self, path: &str) -> FeelValue {
        self.lookup_segments(&split_path(path))
    }

    pub fn lookup_segments<S: AsRef<str>>(&self, segments: &[S]) -> FeelValue {
        get_nested_value(&self.values, segments)
            .cloned()
            .unwrap_or(FeelValue::Null)
    }

    /// New snapshot with `name` bound to `value`
    pub fn with_binding(&self, name: impl Into<String>, value: FeelValue) -> Self {
        let mut values = FeelContext::clone(&self.values);
        values.insert(name.into(), value);
        Self::new(values)
    }

    /// New snapshot with several bindings added
    pub fn with_bindings<I>(&self, bindings: I) -> Self
    where
        I: IntoIterator<Item = (String, FeelValue)>,
    {
        let mut values = FeelContext::clone(&self.values);
        values.extend(bindings);
        Self::new(values)
    }

    pub fn values(&self) -> &FeelContext {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Context as a FEEL context value
    pub fn to_value(&self) -> FeelValue {
        FeelValue::Context(Arc::clone(&self.values))
    }
}

impl From<FeelContext> for Context {
    fn from(values: FeelContext) -> Self {
        Self::new(values)
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_copies_input() {
        let mut input = json!({"user": {"age": 30, "tags": ["a", "b"]}});
        let context = Context::from_json(&input).unwrap();
        input["user"]["age"] = json!(99);

        assert_eq!(context.lookup("user.age"), FeelValue::from(30_i64));
        assert_eq!(context.lookup("user.tags").as_list().map(|l| l.len()), Some(2));
    }

    #[test]
    fn test_missing_paths_are_null() {
        let context = Context::from_json(&json!({"a": {"b": 1}, "s": "text"})).unwrap();
        assert!(context.lookup("a.c").is_null());
        assert!(context.lookup("s.length").is_null());
        assert!(context.lookup("nothing").is_null());
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Context::from_json(&json!([1, 2])).is_err());
        assert!(Context::from_json(&json!(null)).unwrap().is_empty());
    }

    #[test]
    fn test_binding_leaves_original_untouched() {
        let base = Context::from_pairs([("x", FeelValue::from(1_i64))]);
        let child = base.with_binding("y", FeelValue::from(2_i64));
        assert_eq!(child.len(), 2);
        assert_eq!(base.len(), 1);
        assert!(base.get("y").is_none());
    }

    #[test]
    fn test_serialize_as_object() {
        let context = Context::from_pairs([("flag", FeelValue::from(true))]);
        assert_eq!(serde_json::to_value(&context).unwrap(), json!({"flag": true}));
    }
}
