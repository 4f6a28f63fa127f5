//! Core trait definitions for the repository pattern
//!
//! - [`Repository`]: read-only interface for loading definitions by id
//! - [`CacheableRepository`]: cache management on top of it
//!
//! ```no_run
//! use verdict_repository::{FileSystemRepository, Repository};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = FileSystemRepository::new("definitions")?;
//! let (ruleset, _source) = repo.load_ruleset("fraud").await?;
//! println!("{} has {} rules", ruleset.name, ruleset.rules.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use verdict_core::ast::{DecisionGraphDefinition, Ruleset};

use crate::models::ArtifactKind;
use crate::{CacheStats, RepositoryResult};

/// Source of ruleset and decision graph definitions
///
/// Loads return the parsed definition together with the document text it
/// was parsed from. Identifiers are plain names; path separators and `..`
/// are rejected with [`RepositoryError::InvalidIdentifier`](crate::RepositoryError::InvalidIdentifier).
#[async_trait]
pub trait Repository: Send + Sync {
    /// Load a ruleset by id
    async fn load_ruleset(&self, id: &str) -> RepositoryResult<(Ruleset, String)>;

    /// Load a decision graph definition by id
    async fn load_decision_graph(
        &self,
        id: &str,
    ) -> RepositoryResult<(DecisionGraphDefinition, String)>;

    /// Check if a definition exists without parsing it
    async fn exists(&self, kind: ArtifactKind, id: &str) -> RepositoryResult<bool>;

    /// Ids of all stored rulesets, sorted
    async fn list_rulesets(&self) -> RepositoryResult<Vec<String>>;

    /// Ids of all stored decision graphs, sorted
    async fn list_decision_graphs(&self) -> RepositoryResult<Vec<String>>;
}

/// Extension trait for repositories that keep parsed definitions
#[async_trait]
pub trait CacheableRepository: Repository {
    /// Clear all caches
    async fn clear_cache(&self);

    /// Drop one cached definition
    async fn clear_cache_entry(&self, kind: ArtifactKind, id: &str);

    /// Hits and misses since creation, size of the caches now
    async fn cache_stats(&self) -> CacheStats;

    fn is_cache_enabled(&self) -> bool;
}
