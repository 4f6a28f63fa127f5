//! Condition evaluation caches
//!
//! Five process-wide memo tables back the operator categories: compiled
//! regexes, split field paths, parsed dates, geospatial distances and
//! normalized operator parameters.

use chrono::NaiveDateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use regex::Regex;
use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Concurrent memo table.
///
/// Hits are served by a shared read of the owning shard. A miss takes the
/// shard's write lock and checks the key again before computing, so a caller
/// that loses the race reuses the stored value instead of replacing it.
pub struct MemoCache<K, V> {
    entries: DashMap<K, V>,
}

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Cached value for `key`, computing and storing it on first use
    pub fn get_or_insert_with<Q>(&self, key: &Q, compute: impl FnOnce() -> V) -> V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let value = compute();
                entry.insert(value.clone());
                value
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<K: Eq + Hash, V: Clone> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance cache key: both points rounded to 4 decimal places (about 11 m)
pub(crate) type DistanceKey = (i64, i64, i64, i64);

/// Cache sizes, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub regexes: usize,
    pub regex_compilations: usize,
    pub paths: usize,
    pub dates: usize,
    pub distances: usize,
    pub params: usize,
}

/// Caches shared by every condition evaluator in the process
#[derive(Default)]
pub struct ConditionCaches {
    /// `None` records a pattern that failed to compile
    regexes: MemoCache<String, Option<Arc<Regex>>>,
    regex_compilations: AtomicUsize,
    pub(crate) paths: MemoCache<String, Arc<[String]>>,
    /// `None` records input that is not a recognizable date
    pub(crate) dates: MemoCache<String, Option<NaiveDateTime>>,
    pub(crate) distances: MemoCache<DistanceKey, f64>,
    /// Keyed by operator and parameter text
    pub(crate) params: MemoCache<String, Option<(f64, f64)>>,
}

impl ConditionCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance
    pub fn global() -> Arc<ConditionCaches> {
        static GLOBAL: OnceLock<Arc<ConditionCaches>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(ConditionCaches::new())))
    }

    /// Compiled regex for `pattern`, compiled at most once per cache
    pub fn regex(&self, pattern: &str) -> Option<Arc<Regex>> {
        self.regexes.get_or_insert_with(pattern, || {
            self.regex_compilations.fetch_add(1, Ordering::Relaxed);
            match Regex::new(pattern) {
                Ok(regex) => Some(Arc::new(regex)),
                Err(e) => {
                    tracing::warn!("Invalid regex pattern '{}': {}", pattern, e);
                    None
                }
            }
        })
    }

    /// Dotted field path split into segments
    pub fn path(&self, field: &str) -> Arc<[String]> {
        self.paths
            .get_or_insert_with(field, || field.split('.').map(str::to_string).collect())
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            regexes: self.regexes.len(),
            regex_compilations: self.regex_compilations.load(Ordering::Relaxed),
            paths: self.paths.len(),
            dates: self.dates.len(),
            distances: self.distances.len(),
            params: self.params.len(),
        }
    }

    pub fn clear(&self) {
        self.regexes.clear();
        self.paths.clear();
        self.dates.clear();
        self.distances.clear();
        self.params.clear();
    }
}
