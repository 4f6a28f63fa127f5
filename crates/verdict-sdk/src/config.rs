//! Agent configuration
//!
//! ```yaml
//! name: loan_desk
//! strategy: majority_vote
//! audit_sink: tracing
//! audit_cache_capacity: 256
//! repository:
//!   source: file_system
//!   base_path: ./definitions
//! rulesets: [fraud, limits]
//! decisions:
//!   - graph: loan_approval
//!     decision: risk
//! ```

use crate::error::{Result, SdkError};
use crate::scoring::STRATEGY_NAMES;
use serde::{Deserialize, Serialize};
use std::path::Path;
use verdict_repository::RepositoryConfig;

/// Built-in audit sinks selectable from configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    #[default]
    Tracing,
    Noop,
}

/// One decision of a stored graph used as an evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDecisionRef {
    /// Graph id in the repository
    pub graph: String,
    /// Decision evaluated for each request
    pub decision: String,
    /// Evaluator name; defaults to `<graph name>::<decision>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Main agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,

    /// Scoring strategy name
    #[serde(default = "default_strategy")]
    pub strategy: String,

    #[serde(default)]
    pub audit_sink: AuditSinkKind,

    /// Memoized audit hashes kept by this agent; the shared process-wide
    /// hasher is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_cache_capacity: Option<usize>,

    /// Where `rulesets` and `decisions` are loaded from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<RepositoryConfig>,

    /// Ruleset ids, one rule engine each
    #[serde(default)]
    pub rulesets: Vec<String>,

    #[serde(default)]
    pub decisions: Vec<GraphDecisionRef>,
}

fn default_strategy() -> String {
    "weighted_average".to_string()
}

impl AgentConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strategy: default_strategy(),
            audit_sink: AuditSinkKind::default(),
            audit_cache_capacity: None,
            repository: None,
            rulesets: Vec::new(),
            decisions: Vec::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    pub fn with_audit_sink(mut self, kind: AuditSinkKind) -> Self {
        self.audit_sink = kind;
        self
    }

    pub fn with_repository(mut self, repository: RepositoryConfig) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_ruleset(mut self, id: impl Into<String>) -> Self {
        self.rulesets.push(id.into());
        self
    }

    pub fn with_decision(mut self, graph: impl Into<String>, decision: impl Into<String>) -> Self {
        self.decisions.push(GraphDecisionRef {
            graph: graph.into(),
            decision: decision.into(),
            name: None,
        });
        self
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| SdkError::ConfigError(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| SdkError::ConfigError(e.to_string()))
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text)?,
            _ => {
                return Err(SdkError::ConfigError(format!(
                    "unsupported config file type: {}",
                    path.display()
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the parts that can be checked without loading definitions
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(SdkError::ConfigError("agent name is empty".to_string()));
        }
        if !STRATEGY_NAMES.contains(&self.strategy.trim().to_ascii_lowercase().as_str()) {
            return Err(SdkError::UnknownStrategy(self.strategy.clone()));
        }
        let needs_repository = !self.rulesets.is_empty() || !self.decisions.is_empty();
        match &self.repository {
            Some(repository) => repository
                .validate()
                .map_err(|e| SdkError::ConfigError(e.to_string()))?,
            None if needs_repository => {
                return Err(SdkError::ConfigError(
                    "rulesets and decisions require a repository".to_string(),
                ))
            }
            None => {}
        }
        Ok(())
    }
}
