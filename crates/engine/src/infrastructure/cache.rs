//! Unbounded memoization cache with single-flight fills.
//!
//! Title metadata never changes for the lifetime of the process, so entries
//! are kept forever and never expire. The key space is bounded by the number
//! of distinct titles seen in live sessions.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

/// Thread-safe memo cache.
///
/// Concurrent `get_or_fill` calls for the same key share one fill. A fill
/// that produces `None` caches nothing, and the next caller tries again.
pub struct MemoCache<K, V> {
    entries: DashMap<K, Arc<OnceCell<V>>>,
}

/// Marker used to leave a cell empty when a fill produced nothing.
struct Unfilled;

impl<K, V> MemoCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Get a cached value, or run `fill` once and cache a `Some` result.
    pub async fn get_or_fill<F, Fut>(&self, key: K, fill: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        // Clone the cell out so no map guard is held across the await.
        let cell = Arc::clone(&self.entries.entry(key).or_default());

        cell.get_or_try_init(|| async { fill().await.ok_or(Unfilled) })
            .await
            .ok()
            .cloned()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.entries
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of filled entries.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of filled entries, in no particular order.
    pub fn keys(&self) -> Vec<K> {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl<K, V> Default for MemoCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
