//! Repository configuration types
//!
//! Selects where definitions are loaded from: a directory tree on disk or
//! an in-memory store filled by the caller.

use crate::error::RepositoryResult;
use crate::{FileSystemRepository, MemoryRepository, Repository};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Repository source type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepositorySource {
    /// Load from `<base_path>/rulesets` and `<base_path>/decisions`
    #[default]
    FileSystem,
    /// Definitions registered in process
    Memory,
}

/// Repository configuration
///
/// # Examples
///
/// ```rust
/// use verdict_repository::RepositoryConfig;
///
/// let config = RepositoryConfig::file_system("definitions");
/// assert!(config.validate().is_ok());
///
/// let config = RepositoryConfig::memory().with_cache(false);
/// assert!(!config.cache_enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Configuration source type
    #[serde(default)]
    pub source: RepositorySource,

    /// File system base path (required for FileSystem source)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Keep parsed definitions after the first load
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,
}

fn default_cache_enabled() -> bool {
    true
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            source: RepositorySource::default(),
            base_path: None,
            cache_enabled: default_cache_enabled(),
        }
    }
}

impl RepositoryConfig {
    /// Create a file system repository configuration
    pub fn file_system(path: impl Into<String>) -> Self {
        Self {
            source: RepositorySource::FileSystem,
            base_path: Some(path.into()),
            cache_enabled: true,
        }
    }

    /// Create a memory repository configuration
    pub fn memory() -> Self {
        Self {
            source: RepositorySource::Memory,
            base_path: None,
            cache_enabled: true,
        }
    }

    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Validate the configuration
    ///
    /// Returns an error if required fields are missing for the selected source.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.source {
            RepositorySource::FileSystem => {
                if self.base_path.as_deref().map_or(true, str::is_empty) {
                    return Err(ConfigError::MissingField {
                        source: "FileSystem".to_string(),
                        field: "base_path".to_string(),
                    });
                }
            }
            RepositorySource::Memory => {}
        }
        Ok(())
    }

    /// Open the configured repository
    ///
    /// A memory source yields an empty store; callers that need preloaded
    /// definitions construct [`MemoryRepository`] directly.
    pub fn build(&self) -> RepositoryResult<Arc<dyn Repository>> {
        self.validate()?;
        match self.source {
            RepositorySource::FileSystem => {
                let path = self.base_path.as_deref().unwrap_or_default();
                let repo = FileSystemRepository::new(path)?.with_cache_enabled(self.cache_enabled);
                Ok(Arc::new(repo))
            }
            RepositorySource::Memory => Ok(Arc::new(
                MemoryRepository::new().with_cache_enabled(self.cache_enabled),
            )),
        }
    }
}

/// Configuration error
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// A required field is missing for the selected source
    MissingField { source: String, field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingField { source, field } => {
                write!(f, "{} source requires {} to be set", source, field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_system_config() {
        let config = RepositoryConfig::file_system("definitions");

        assert_eq!(config.source, RepositorySource::FileSystem);
        assert_eq!(config.base_path, Some("definitions".to_string()));
        assert!(config.cache_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_base_path() {
        let config = RepositoryConfig::default();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "FileSystem source requires base_path to be set"
        );
    }

    #[test]
    fn test_memory_config() {
        let config = RepositoryConfig::memory();
        assert!(config.base_path.is_none());
        assert!(config.validate().is_ok());
        assert!(config.build().is_ok());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: RepositoryConfig =
            serde_yaml::from_str("source: file_system\nbase_path: ./defs\n").unwrap();
        assert_eq!(config.source, RepositorySource::FileSystem);
        assert!(config.cache_enabled);

        let config: RepositoryConfig =
            serde_json::from_str(r#"{"source": "memory", "cache_enabled": false}"#).unwrap();
        assert_eq!(config.source, RepositorySource::Memory);
        assert!(!config.cache_enabled);
    }
}
