//! Data models for the repository layer

use crate::{RepositoryError, RepositoryResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Document extensions tried in order when resolving an id on disk
pub const DOCUMENT_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Kinds of stored definitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Ruleset,
    DecisionGraph,
}

impl ArtifactKind {
    /// Directory under the repository root holding this kind
    pub fn directory(&self) -> &'static str {
        match self {
            ArtifactKind::Ruleset => "rulesets",
            ArtifactKind::DecisionGraph => "decisions",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Ruleset => f.write_str("Ruleset"),
            ArtifactKind::DecisionGraph => f.write_str("Decision graph"),
        }
    }
}

/// Reject ids that are empty or could address a file outside their directory
pub(crate) fn validate_identifier(id: &str) -> RepositoryResult<()> {
    let invalid = id.trim().is_empty()
        || id.contains(['/', '\\'])
        || id.contains("..");
    if invalid {
        return Err(RepositoryError::InvalidIdentifier(id.to_string()));
    }
    Ok(())
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries in cache
    pub size: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A cached definition with the text it was parsed from
#[derive(Debug, Clone)]
pub(crate) struct CachedArtifact<T> {
    pub data: T,
    pub content: String,
}

/// Lock-free hit/miss counters
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheCounters {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size,
        }
    }
}
