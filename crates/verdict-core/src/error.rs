//! Error types for Verdict Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A value could not be coerced to the expected FEEL type
    #[error("Type error: expected {expected}, got {actual} ({raw:?})")]
    TypeError {
        expected: String,
        actual: String,
        raw: String,
    },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl CoreError {
    pub fn type_error(
        expected: impl Into<String>,
        actual: impl Into<String>,
        raw: impl Into<String>,
    ) -> Self {
        CoreError::TypeError {
            expected: expected.into(),
            actual: actual.into(),
            raw: raw.into(),
        }
    }
}

/// Malformed ruleset, decision table or decision graph.
///
/// These are definition-time defects: they are reported to the caller and
/// never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Missing required field
    #[error("Missing required field '{field}' in {location}")]
    MissingField { location: String, field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}' in {location}: {message}")]
    InvalidValue {
        location: String,
        field: String,
        message: String,
    },

    /// Two definitions share one identifier
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: String, id: String },

    /// UNIQUE hit policy matched zero or several rules
    #[error(
        "UNIQUE hit policy violated in '{table}': expected exactly one match, got {} [{}]",
        rule_ids.len(),
        rule_ids.join(", ")
    )]
    UniqueViolation { table: String, rule_ids: Vec<String> },

    /// ANY hit policy matched rules with different outputs
    #[error(
        "ANY hit policy violated in '{table}': rules [{}] disagree on decisions [{}]",
        rule_ids.join(", "),
        decisions.join(", ")
    )]
    AnyConflict {
        table: String,
        rule_ids: Vec<String>,
        decisions: Vec<String>,
    },

    /// Decision dependency edges contain a cycle
    #[error("Circular dependency detected at decision '{decision}' (path: {})", path.join(" -> "))]
    CircularDependency { decision: String, path: Vec<String> },

    /// A dependency names a decision that is not in the graph
    #[error("Decision '{decision}' depends on unknown decision '{dependency}'")]
    UnknownDependency { decision: String, dependency: String },

    /// Requested decision is not in the graph
    #[error("Unknown decision: {0}")]
    UnknownDecision(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_message() {
        let err = CoreError::type_error("date (YYYY-MM-DD)", "string", "2024-13-40");
        let msg = err.to_string();
        assert!(msg.contains("date (YYYY-MM-DD)"));
        assert!(msg.contains("2024-13-40"));
    }

    #[test]
    fn test_unique_violation_names_rules() {
        let err = ConfigurationError::UniqueViolation {
            table: "eligibility".to_string(),
            rule_ids: vec!["r1".to_string(), "r2".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("r1, r2"));
        assert!(msg.contains("got 2"));
    }

    #[test]
    fn test_circular_dependency_path() {
        let err = ConfigurationError::CircularDependency {
            decision: "a".to_string(),
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert!(err.to_string().contains("a -> b -> a"));
    }
}
