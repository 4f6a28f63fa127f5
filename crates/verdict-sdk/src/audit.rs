//! Audit payload hashing and audit sinks
//!
//! The hash covers a canonical (RFC 8785) serialization of the payload, so
//! two payloads that differ only in key order hash identically. Hashes are
//! memoized per canonical text in a bounded cache that evicts the oldest
//! entry first.

use crate::decision::Decision;
use crate::error::{Result, SdkError};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::info;
use verdict_runtime::Context;

/// Entries kept by the process-wide hasher
pub const DEFAULT_AUDIT_CACHE_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct FifoCache {
    entries: HashMap<String, String>,
    order: VecDeque<String>,
}

/// SHA-256 over canonical JSON, memoized
#[derive(Debug)]
pub struct AuditHasher {
    capacity: usize,
    cache: Mutex<FifoCache>,
    computations: AtomicUsize,
}

impl Default for AuditHasher {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIT_CACHE_CAPACITY)
    }
}

impl AuditHasher {
    /// A capacity of zero disables memoization
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cache: Mutex::new(FifoCache::default()),
            computations: AtomicUsize::new(0),
        }
    }

    /// The process-wide instance
    pub fn global() -> Arc<AuditHasher> {
        static GLOBAL: OnceLock<Arc<AuditHasher>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(AuditHasher::default())))
    }

    /// Canonical serialization of `payload`
    pub fn canonicalize(payload: &serde_json::Value) -> Result<String> {
        serde_jcs::to_string(payload).map_err(|e| SdkError::Audit(e.to_string()))
    }

    /// Lowercase hex SHA-256 of the canonical form of `payload`
    pub fn hash(&self, payload: &serde_json::Value) -> Result<String> {
        let canonical = Self::canonicalize(payload)?;
        if let Some(hash) = self.lock().entries.get(&canonical) {
            return Ok(hash.clone());
        }

        let digest = hex::encode(Sha256::digest(canonical.as_bytes()));
        self.computations.fetch_add(1, Ordering::Relaxed);
        if self.capacity == 0 {
            return Ok(digest);
        }

        let mut cache = self.lock();
        if let Some(existing) = cache.entries.get(&canonical) {
            return Ok(existing.clone());
        }
        while cache.order.len() >= self.capacity {
            match cache.order.pop_front() {
                Some(oldest) => {
                    cache.entries.remove(&oldest);
                }
                None => break,
            }
        }
        cache.order.push_back(canonical.clone());
        cache.entries.insert(canonical, digest.clone());
        Ok(digest)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of memoized hashes
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Digests computed so far, cache hits excluded
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        let mut cache = self.lock();
        cache.entries.clear();
        cache.order.clear();
    }

    fn lock(&self) -> MutexGuard<'_, FifoCache> {
        // Entries are written whole under the lock, so a poisoned cache is still consistent
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiver for finished decisions
///
/// Called exactly once per [`Agent::decide`](crate::Agent::decide), on the
/// calling thread, after aggregation.
pub trait AuditSink: Send + Sync {
    fn record(&self, decision: &Decision, context: &Context);
}

/// Writes each decision as an `info` event on the `verdict::audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, decision: &Decision, context: &Context) {
        info!(
            target: "verdict::audit",
            decision = decision.decision(),
            confidence = decision.confidence(),
            strategy = decision.strategy(),
            evaluations = decision.evaluations().len(),
            context_fields = context.len(),
            audit_hash = decision.audit_hash(),
            "Decision recorded"
        );
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _decision: &Decision, _context: &Context) {}
}
