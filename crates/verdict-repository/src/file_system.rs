//! File system based repository implementation

use async_trait::async_trait;
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use verdict_core::ast::{DecisionGraphDefinition, Ruleset};
use verdict_parser::{DecisionGraphParser, DefinitionError, RulesetParser};

use crate::cache::{combine, ArtifactCache};
use crate::models::{validate_identifier, ArtifactKind, DOCUMENT_EXTENSIONS};
use crate::{CacheStats, CacheableRepository, Repository, RepositoryError, RepositoryResult};

/// File system based repository
///
/// Layout under the root:
///
/// ```text
/// <root>/rulesets/<id>.{json,yaml,yml}
/// <root>/decisions/<id>.{json,yaml,yml}
/// ```
///
/// When several extensions exist for one id the first in that order wins.
#[derive(Debug)]
pub struct FileSystemRepository {
    /// Root path of the repository
    root_path: PathBuf,
    rulesets: ArtifactCache<Ruleset>,
    graphs: ArtifactCache<DecisionGraphDefinition>,
}

impl FileSystemRepository {
    /// Create a new file system repository
    ///
    /// ```no_run
    /// use verdict_repository::FileSystemRepository;
    ///
    /// let repo = FileSystemRepository::new("definitions").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();

        if !path.is_dir() {
            return Err(RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            });
        }

        let abs_path = path
            .absolutize()
            .map_err(RepositoryError::Io)?
            .to_path_buf();

        Ok(Self {
            root_path: abs_path,
            rulesets: ArtifactCache::new(true),
            graphs: ArtifactCache::new(true),
        })
    }

    pub fn with_cache_enabled(mut self, enabled: bool) -> Self {
        self.rulesets.set_enabled(enabled);
        self.graphs.set_enabled(enabled);
        self
    }

    /// Get the absolute root path of the repository
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// First existing document for `id`
    async fn locate(&self, kind: ArtifactKind, id: &str) -> RepositoryResult<Option<PathBuf>> {
        validate_identifier(id)?;
        let dir = self.root_path.join(kind.directory());
        for ext in DOCUMENT_EXTENSIONS {
            let path = dir.join(format!("{}.{}", id, ext));
            match fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => return Ok(Some(path)),
                Ok(_) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
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

        let path = self
            .locate(kind, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound {
                kind: kind.to_string(),
                id: id.to_string(),
            })?;
        let content = fs::read_to_string(&path).await?;
        let data = parse(&content).map_err(|source| RepositoryError::Definition {
            id: id.to_string(),
            source,
        })?;
        debug!("Loaded {} '{}' from {}", kind, id, path.display());

        cache.insert(id, data.clone(), content.clone()).await;
        Ok((data, content))
    }

    /// Document stems in one kind's directory, sorted and deduplicated
    async fn list(&self, kind: ArtifactKind) -> RepositoryResult<Vec<String>> {
        let dir_path = self.root_path.join(kind.directory());
        let mut entries = match fs::read_dir(&dir_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_document = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(false, |ext| DOCUMENT_EXTENSIONS.contains(&ext));
            if !is_document || !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

#[async_trait]
impl Repository for FileSystemRepository {
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
        Ok(self.locate(kind, id).await?.is_some())
    }

    async fn list_rulesets(&self) -> RepositoryResult<Vec<String>> {
        self.list(ArtifactKind::Ruleset).await
    }

    async fn list_decision_graphs(&self) -> RepositoryResult<Vec<String>> {
        self.list(ArtifactKind::DecisionGraph).await
    }
}

#[async_trait]
impl CacheableRepository for FileSystemRepository {
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_root_rejected() {
        let err = FileSystemRepository::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn test_root_is_absolute() {
        let dir = TempDir::new().unwrap();
        let repo = FileSystemRepository::new(dir.path()).unwrap();
        assert!(repo.root_path().is_absolute());
        assert!(repo.list_rulesets().await.unwrap().is_empty());
    }
}
