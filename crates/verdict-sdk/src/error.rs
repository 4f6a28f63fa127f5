//! SDK error types

use thiserror::Error;
use verdict_core::ConfigurationError;
use verdict_parser::DefinitionError;
use verdict_repository::RepositoryError;
use verdict_runtime::RuntimeError;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Every evaluator abstained or failed for the request
    #[error("No evaluations: all {evaluators} evaluators abstained")]
    NoEvaluations { evaluators: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Scoring strategy name not recognized
    #[error("Unknown scoring strategy: {0}")]
    UnknownStrategy(String),

    /// Malformed ruleset, table or graph
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Definition document failed to parse
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] RuntimeError),

    /// Repository error
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Audit payload could not be serialized
    #[error("Audit serialization failed: {0}")]
    Audit(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_evaluations_message() {
        let error = SdkError::NoEvaluations { evaluators: 3 };
        assert_eq!(
            error.to_string(),
            "No evaluations: all 3 evaluators abstained"
        );
    }

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("missing strategy".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("missing strategy"));
    }

    #[test]
    fn test_configuration_error_is_transparent() {
        let error: SdkError = ConfigurationError::UnknownDecision("risk".to_string()).into();
        assert_eq!(
            error.to_string(),
            ConfigurationError::UnknownDecision("risk".to_string()).to_string()
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }
}
