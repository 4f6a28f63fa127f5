//! Error types for the repository layer

use std::path::PathBuf;
use thiserror::Error;
use verdict_parser::DefinitionError;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// No artifact of this kind has the identifier
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document is not a valid definition
    #[error("Invalid definition '{id}': {source}")]
    Definition {
        id: String,
        #[source]
        source: DefinitionError,
    },

    /// Invalid path provided
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Identifier that would escape the repository root
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Repository configuration is incomplete
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
}
