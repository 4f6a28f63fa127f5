//! Read-through cache for parsed definitions

use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::models::{CacheCounters, CachedArtifact};
use crate::CacheStats;

/// Parsed definitions keyed by id, with hit/miss accounting
#[derive(Debug)]
pub(crate) struct ArtifactCache<T> {
    entries: RwLock<HashMap<String, CachedArtifact<T>>>,
    counters: CacheCounters,
    enabled: bool,
}

impl<T: Clone> ArtifactCache<T> {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            counters: CacheCounters::default(),
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops anything already stored
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.entries.get_mut().clear();
        }
    }

    pub async fn get(&self, id: &str) -> Option<(T, String)> {
        if !self.enabled {
            return None;
        }
        let entries = self.entries.read().await;
        match entries.get(id) {
            Some(cached) => {
                self.counters.hit();
                Some((cached.data.clone(), cached.content.clone()))
            }
            None => {
                self.counters.miss();
                None
            }
        }
    }

    pub async fn insert(&self, id: &str, data: T, content: String) {
        if self.enabled {
            self.entries
                .write()
                .await
                .insert(id.to_string(), CachedArtifact { data, content });
        }
    }

    pub async fn remove(&self, id: &str) {
        self.entries.write().await.remove(id);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        let size = self.entries.read().await.len();
        self.counters.snapshot(size)
    }
}

/// Sum of per-kind statistics
pub(crate) fn combine(a: CacheStats, b: CacheStats) -> CacheStats {
    CacheStats {
        hits: a.hits + b.hits,
        misses: a.misses + b.misses,
        size: a.size + b.size,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_after_insert() {
        let cache: ArtifactCache<u32> = ArtifactCache::new(true);
        assert!(cache.get("a").await.is_none());
        cache.insert("a", 7, "7".to_string()).await;
        assert_eq!(cache.get("a").await, Some((7, "7".to_string())));

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.size), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache: ArtifactCache<u32> = ArtifactCache::new(false);
        cache.insert("a", 7, "7".to_string()).await;
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.stats().await, CacheStats::default());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let mut cache: ArtifactCache<u32> = ArtifactCache::new(true);
        cache.insert("a", 1, String::new()).await;
        cache.insert("b", 2, String::new()).await;
        cache.remove("a").await;
        assert_eq!(cache.stats().await.size, 1);
        cache.clear().await;
        assert_eq!(cache.stats().await.size, 0);

        cache.insert("c", 3, String::new()).await;
        cache.set_enabled(false);
        assert!(!cache.is_enabled());
        assert_eq!(cache.stats().await.size, 0);
    }
}
