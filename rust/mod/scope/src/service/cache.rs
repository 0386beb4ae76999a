use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::hierarchy::HierarchyGraph;

struct CacheEntry {
    graph: Arc<HierarchyGraph>,
    inserted_at: Instant,
}

/// Single-slot TTL cache for the loaded hierarchy.
///
/// Sessions hold their own `Arc`, so replacing the entry never changes a
/// session that is already running.
pub struct HierarchyCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl HierarchyCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            entry: RwLock::new(None),
        }
    }

    /// Cached graph, or `None` if expired or missing.
    pub fn get(&self) -> Option<Arc<HierarchyGraph>> {
        let entry = self.entry.read().unwrap_or_else(PoisonError::into_inner);
        entry
            .as_ref()
            .filter(|e| e.inserted_at.elapsed() < self.ttl)
            .map(|e| Arc::clone(&e.graph))
    }

    pub fn set(&self, graph: Arc<HierarchyGraph>) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = Some(CacheEntry {
            graph,
            inserted_at: Instant::now(),
        });
    }

    pub fn invalidate(&self) {
        let mut entry = self.entry.write().unwrap_or_else(PoisonError::into_inner);
        *entry = None;
    }
}
