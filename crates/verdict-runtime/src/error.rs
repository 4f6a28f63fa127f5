//! Runtime error types

use thiserror::Error;
use verdict_core::{ConfigurationError, CoreError};
use verdict_parser::FeelError;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Value not coercible to the expected FEEL type
    #[error(transparent)]
    Type(#[from] CoreError),

    /// Malformed ruleset, table or graph detected while evaluating
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// FEEL source handed to the runtime did not parse
    #[error(transparent)]
    Feel(#[from] FeelError),

    /// Input data is not a key-value document
    #[error("Invalid context: {0}")]
    InvalidContext(String),

    /// Call to a function that is neither built in nor bound in scope
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number or kind of arguments for a function
    #[error("Invalid arguments for '{function}': {message}")]
    InvalidArguments { function: String, message: String },

    /// Native decision function reported a failure
    #[error("Function '{function}' failed: {message}")]
    Function { function: String, message: String },

    /// Expression form that cannot produce a value on its own
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}

impl RuntimeError {
    pub(crate) fn invalid_arguments(function: &str, message: impl Into<String>) -> Self {
        RuntimeError::InvalidArguments {
            function: function.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
