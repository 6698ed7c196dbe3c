use dashmap::DashMap;
use log::{debug, trace};
use std::sync::Arc;

use crate::policy::EffectivePolicy;

/// Caller-owned cache of resolved policies, keyed by config identity (a
/// caller-chosen string such as a config path plus revision), never by value.
/// Reads are concurrent; invalidation rebuilds the map wholesale and takes
/// `&mut self`, so it cannot race readers.
#[derive(Debug, Default)]
pub struct PolicyCache {
    inner: DashMap<String, Arc<EffectivePolicy>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<EffectivePolicy>> {
        let hit = self.inner.get(key).map(|entry| Arc::clone(entry.value()));
        trace!("Policy cache {} for '{}'", if hit.is_some() { "hit" } else { "miss" }, key);
        hit
    }

    pub fn get_or_insert_with(
        &self,
        key: &str,
        build: impl FnOnce() -> EffectivePolicy,
    ) -> Arc<EffectivePolicy> {
        if let Some(policy) = self.get(key) {
            return policy;
        }
        let policy = Arc::new(build());
        self.inner.insert(key.to_string(), Arc::clone(&policy));
        policy
    }

    /// Drop every cached policy. Callers invalidate on config change; entries
    /// are rebuilt lazily on the next request.
    pub fn invalidate(&mut self) {
        debug!("Invalidating policy cache ({} entries)", self.inner.len());
        self.inner = DashMap::new();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
