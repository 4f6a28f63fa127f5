//! Parser error types

use thiserror::Error;
use verdict_core::ConfigurationError;

/// Malformed FEEL syntax
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at position {position}{}: {message}", character.map(|c| format!(" ('{}')", c)).unwrap_or_default())]
pub struct ParseError {
    pub message: String,
    /// Offending character, `None` at end of input
    pub character: Option<char>,
    /// Character offset into the source
    pub position: usize,
}

impl ParseError {
    pub fn at(message: impl Into<String>, character: Option<char>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            character,
            position,
        }
    }
}

/// Parse tree that cannot be normalized into an AST
#[derive(Error, Debug)]
#[error("Transform error: {message} (in {subtree})")]
pub struct TransformError {
    pub message: String,
    /// Debug rendering of the offending parse-tree node
    pub subtree: String,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransformError {
    pub fn new(message: impl Into<String>, subtree: impl std::fmt::Debug) -> Self {
        TransformError {
            message: message.into(),
            subtree: format!("{:?}", subtree),
            cause: None,
        }
    }

    /// Attach the underlying error
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Any failure turning FEEL source into an AST
#[derive(Error, Debug)]
pub enum FeelError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Failure loading a ruleset or decision graph definition
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// Document is neither valid JSON nor valid YAML
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// A FEEL expression inside the definition failed to parse
    #[error("Invalid FEEL expression in {location}: {source}")]
    Feel {
        location: String,
        #[source]
        source: FeelError,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type for FEEL lexing and parsing
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::at("unexpected token", Some('#'), 4);
        assert_eq!(
            err.to_string(),
            "Parse error at position 4 ('#'): unexpected token"
        );
        let err = ParseError::at("unexpected end of input", None, 7);
        assert_eq!(
            err.to_string(),
            "Parse error at position 7: unexpected end of input"
        );
    }

    #[test]
    fn test_transform_error_keeps_cause() {
        use std::error::Error;
        let cause = "x".parse::<i32>().unwrap_err();
        let err = TransformError::new("bad literal", "Number(\"x\")").with_cause(cause);
        assert!(err.source().is_some());
        assert!(err.to_string().contains("bad literal"));
    }
}
