use crate::foundation::error::LoadError;
use crate::sandbox::capability::{CapabilityContext, CapabilityOptions};
use crate::sandbox::loader::{SceneFactory, load};
use crate::scene::source::SceneSource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5c3a_91d2_e07b_4f68;

/// Shared result of loading one scene source.
pub type LoadOutcome = Arc<Result<SceneFactory, LoadError>>;

/// 128-bit content fingerprint of a scene source and the context it is loaded against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceKey {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    /// Length-prefixed, so adjacent fields cannot run into each other.
    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn write_json<T: serde::Serialize>(&mut self, v: &T) {
        // Maps serialize with sorted keys, so equal values hash equally.
        let s = serde_json::to_string(v).unwrap_or_default();
        self.write_str(&s);
    }

    fn finish(self) -> SourceKey {
        let v = self.inner.digest128();
        SourceKey {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Fingerprint everything a load outcome depends on.
pub fn fingerprint_source(source: &SceneSource, options: &CapabilityOptions) -> SourceKey {
    let mut h = StableHasher::new();
    h.write_str(&source.id);
    h.write_str(&source.code);
    h.write_json(&source.props);
    h.write_json(&source.colors);
    h.write_json(options);
    h.finish()
}

/// Hit/miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that ran a load.
    pub misses: u64,
}

/// Load-outcome cache. Failures are cached too: a rejected source is never retried.
#[derive(Default)]
pub struct FactoryCache {
    entries: Mutex<HashMap<SourceKey, LoadOutcome>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl std::fmt::Debug for FactoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryCache")
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

impl FactoryCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for `source`, loading it on first use.
    ///
    /// The lock is not held while loading; when two threads race on the same source the first
    /// inserted outcome wins and both return it.
    pub fn get_or_load(&self, source: &SceneSource, ctx: &Arc<CapabilityContext>) -> LoadOutcome {
        let key = fingerprint_source(source, ctx.options());
        if let Some(hit) = self.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(scene = %source.id, "scene cache hit");
            return Arc::clone(hit);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(scene = %source.id, "scene cache miss");
        let outcome = Arc::new(load(source, Arc::clone(ctx)));
        Arc::clone(self.lock().entry(key).or_insert(outcome))
    }

    /// Number of cached outcomes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Return `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Drop every cached outcome. Counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SourceKey, LoadOutcome>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cache.rs"]
mod tests;
