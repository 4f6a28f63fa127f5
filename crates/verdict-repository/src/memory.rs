//! In-memory repository
//!
//! Holds definition documents as text and parses them on first load, so
//! a memory store reports the same parse errors as one backed by files.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use verdict_core::ast::{DecisionGraphDefinition, Ruleset};
use verdict_parser::{DecisionGraphParser, DefinitionError, RulesetParser};

use crate::cache::{combine, ArtifactCache};
use crate::models::{validate_identifier, ArtifactKind};
use crate::{CacheStats, CacheableRepository, Repository, RepositoryError, RepositoryResult};

/// Repository over documents registered in process
///
/// ```
/// use verdict_repository::{MemoryRepository, Repository};
///
/// # #[tokio::main]
/// # async fn main() {
/// let repo = MemoryRepository::new().with_ruleset(
///     "small",
///     r#"{"ruleset": "small", "rules": []}"#,
/// );
/// assert_eq!(repo.list_rulesets().await.unwrap(), vec!["small"]);
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryRepository {
    ruleset_documents: RwLock<BTreeMap<String, String>>,
    graph_documents: RwLock<BTreeMap<String, String>>,
    rulesets: ArtifactCache<Ruleset>,
    graphs: ArtifactCache<DecisionGraphDefinition>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            ruleset_documents: RwLock::new(BTreeMap::new()),
            graph_documents: RwLock::new(BTreeMap::new()),
            rulesets: ArtifactCache::new(true),
            graphs: ArtifactCache::new(true),
        }
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.rulesets.set_enabled(enabled);
        self.graphs.set_enabled(enabled);
        self
    }

    /// Register a ruleset document (JSON or YAML)
    pub fn with_ruleset(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.ruleset_documents
            .get_mut()
            .insert(id.into(), content.into());
        self
    }

    /// Register a decision graph document (JSON or YAML)
    pub fn with_decision_graph(
        mut self,
        id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.graph_documents
            .get_mut()
            .insert(id.into(), content.into());
        self
    }

    /// Store or replace a document, dropping any parsed copy of the old one
    pub async fn put(
        &self,
        kind: ArtifactKind,
        id: &str,
        content: impl Into<String>,
    ) -> RepositoryResult<()> {
        validate_identifier(id)?;
        let content = content.into();
        match kind {
            ArtifactKind::Ruleset => {
                self.ruleset_documents
                    .write()
                    .await
                    .insert(id.to_string(), content);
                self.rulesets.remove(id).await;
            }
            ArtifactKind::DecisionGraph => {
                self.graph_documents
                    .write()
                    .await
                    .insert(id.to_string(), content);
                self.graphs.remove(id).await;
            }
        }
        Ok(())
    }

    fn documents(&self, kind: ArtifactKind) -> &RwLock<BTreeMap<String, String>> {
        match kind {
            ArtifactKind::Ruleset => &self.ruleset_documents,
            ArtifactKind::DecisionGraph => &self.graph_documents,
        }
    }

    async fn load<T: Clone + Send + Sync>(
        &self,
        kind: ArtifactKind,
        id: &str,
        cache: &ArtifactCache<T>,
        parse: fn(&str) -> Result<T, DefinitionError>,
    ) -> RepositoryResult<(T, String)> {
        validate_identifier(id)?;
        if let Some(hit) = cache.get(id).await {
            return Ok(hit);
        }

        let content = self
            .documents(kind)
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })?;
        let data = parse(&content).map_err(|source| RepositoryError::Definition {
            id: id.to_string(),
            source,
        })?;

        cache.insert(id, data.clone(), content.clone()).await;
        Ok((data, content))
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn load_ruleset(&self, id: &str) -> RepositoryResult<(Ruleset, String)> {
        self.load(ArtifactKind::Ruleset, id, &self.rulesets, RulesetParser::parse)
            .await
    }

    async fn load_decision_graph(
        &self,
        id: &str,
    ) -> RepositoryResult<(DecisionGraphDefinition, String)> {
        self.load(
            ArtifactKind::DecisionGraph,
            id,
            &self.graphs,
            DecisionGraphParser::parse,
        )
        .await
    }

    async fn exists(&self, kind: ArtifactKind, id: &str) -> RepositoryResult<bool> {
        validate_identifier(id)?;
        Ok(self.documents(kind).read().await.contains_key(id))
    }

    async fn list_rulesets(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.ruleset_documents.read().await.keys().cloned().collect())
    }

    async fn list_decision_graphs(&self) -> RepositoryResult<Vec<String>> {
        Ok(self.graph_documents.read().await.keys().cloned().collect())
    }
}

#[async_trait]
impl CacheableRepository for MemoryRepository {
    async fn clear_cache(&self) {
        self.rulesets.clear().await;
        self.graphs.clear().await;
    }

    async fn clear_cache_entry(&self, kind: ArtifactKind, id: &str) {
        match kind {
            ArtifactKind::Ruleset => self.rulesets.remove(id).await,
            ArtifactKind::DecisionGraph => self.graphs.remove(id).await,
        }
    }

    async fn cache_stats(&self) -> CacheStats {
        combine(self.rulesets.stats().await, self.graphs.stats().await)
    }

    fn is_cache_enabled(&self) -> bool {
        self.rulesets.is_enabled()
    }
}
