//! Definition document utilities
//!
//! Rulesets and decision graphs arrive as JSON or YAML. Both are loaded into
//! a `serde_json::Value` so one set of field accessors serves either format.

use crate::error::DefinitionError;
use serde_json::Value;
use verdict_core::ConfigurationError;

/// Document parsing utilities
pub struct DocumentParser;

impl DocumentParser {
    /// Parse JSON, falling back to YAML
    pub fn parse(text: &str) -> Result<Value, DefinitionError> {
        match serde_json::from_str(text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(serde_yaml::from_str(text)?),
        }
    }

    /// Get a required string field
    pub fn get_string(
        obj: &Value,
        field: &str,
        location: &str,
    ) -> Result<String, ConfigurationError> {
        match obj.get(field) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
            Some(Value::String(_)) => Err(ConfigurationError::InvalidValue {
                location: location.to_string(),
                field: field.to_string(),
                message: "must not be empty".to_string(),
            }),
            Some(other) => Err(Self::type_mismatch(location, field, "a string", other)),
            None => Err(Self::missing(location, field)),
        }
    }

    /// Get an optional string field
    pub fn get_optional_string(obj: &Value, field: &str) -> Option<String> {
        obj.get(field).and_then(|v| v.as_str()).map(|s| s.to_string())
    }

    /// Get a field that holds FEEL source; numbers and booleans are accepted
    /// as their literal text
    pub fn get_source(obj: &Value, field: &str, location: &str) -> Result<String, ConfigurationError> {
        match obj.get(field) {
            Some(value) => Self::as_source(value)
                .ok_or_else(|| Self::type_mismatch(location, field, "a FEEL expression", value)),
            None => Err(Self::missing(location, field)),
        }
    }

    /// Literal text of a scalar cell
    pub fn as_source(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null => Some("null".to_string()),
            _ => None,
        }
    }

    /// Get a required array field
    pub fn get_array<'a>(
        obj: &'a Value,
        field: &str,
        location: &str,
    ) -> Result<&'a Vec<Value>, ConfigurationError> {
        match obj.get(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(Self::type_mismatch(location, field, "an array", other)),
            None => Err(Self::missing(location, field)),
        }
    }

    /// Get an optional array field; present but not an array is an error
    pub fn get_optional_array<'a>(
        obj: &'a Value,
        field: &str,
        location: &str,
    ) -> Result<Option<&'a Vec<Value>>, ConfigurationError> {
        match obj.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => Self::get_array(obj, field, location).map(Some),
        }
    }

    /// Get a required object field
    pub fn get_object<'a>(
        obj: &'a Value,
        field: &str,
        location: &str,
    ) -> Result<&'a Value, ConfigurationError> {
        match obj.get(field) {
            Some(value @ Value::Object(_)) => Ok(value),
            Some(other) => Err(Self::type_mismatch(location, field, "an object", other)),
            None => Err(Self::missing(location, field)),
        }
    }

    /// Get an optional number within `[0, 1]`
    pub fn get_unit_interval(
        obj: &Value,
        field: &str,
        location: &str,
    ) -> Result<Option<f64>, ConfigurationError> {
        match obj.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => match n.as_f64() {
                Some(v) if (0.0..=1.0).contains(&v) => Ok(Some(v)),
                _ => Err(ConfigurationError::InvalidValue {
                    location: location.to_string(),
                    field: field.to_string(),
                    message: format!("{} is outside [0, 1]", n),
                }),
            },
            Some(other) => Err(Self::type_mismatch(location, field, "a number", other)),
        }
    }

    /// Check if a field exists
    pub fn has_field(obj: &Value, field: &str) -> bool {
        obj.get(field).is_some()
    }

    pub fn missing(location: &str, field: &str) -> ConfigurationError {
        ConfigurationError::MissingField {
            location: location.to_string(),
            field: field.to_string(),
        }
    }

    fn type_mismatch(location: &str, field: &str, expected: &str, actual: &Value) -> ConfigurationError {
        ConfigurationError::InvalidValue {
            location: location.to_string(),
            field: field.to_string(),
            message: format!("expected {}, got {}", expected, actual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_json_and_yaml() {
        let from_json = DocumentParser::parse(r#"{"ruleset": "a", "rules": []}"#).unwrap();
        let from_yaml = DocumentParser::parse("ruleset: a\nrules: []\n").unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_invalid_document() {
        assert!(matches!(
            DocumentParser::parse("a: [unclosed"),
            Err(DefinitionError::Yaml(_))
        ));
    }

    #[test]
    fn test_get_string_errors() {
        let obj = json!({"id": 5, "name": ""});
        assert!(matches!(
            DocumentParser::get_string(&obj, "missing", "rule"),
            Err(ConfigurationError::MissingField { .. })
        ));
        assert!(matches!(
            DocumentParser::get_string(&obj, "id", "rule"),
            Err(ConfigurationError::InvalidValue { .. })
        ));
        assert!(DocumentParser::get_string(&obj, "name", "rule").is_err());
    }

    #[test]
    fn test_unit_interval() {
        let obj = json!({"ok": 0.5, "high": 1.5});
        assert_eq!(DocumentParser::get_unit_interval(&obj, "ok", "x").unwrap(), Some(0.5));
        assert_eq!(DocumentParser::get_unit_interval(&obj, "none", "x").unwrap(), None);
        assert!(DocumentParser::get_unit_interval(&obj, "high", "x").is_err());
    }

    #[test]
    fn test_source_accepts_scalars() {
        let obj = json!({"a": 5, "b": true, "c": "x > 1", "d": [1]});
        assert_eq!(DocumentParser::get_source(&obj, "a", "t").unwrap(), "5");
        assert_eq!(DocumentParser::get_source(&obj, "b", "t").unwrap(), "true");
        assert_eq!(DocumentParser::get_source(&obj, "c", "t").unwrap(), "x > 1");
        assert!(DocumentParser::get_source(&obj, "d", "t").is_err());
    }
}
