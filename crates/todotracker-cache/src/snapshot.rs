//! Single-value snapshot cache with TTL and explicit invalidation.
//!
//! Holds one cached snapshot of a dataset. Readers check validity without
//! blocking; a miss funnels through an exclusive refill section with a
//! double-check so concurrent misses collapse into one fetch. Writers
//! call [`SnapshotCache::invalidate`] so the next read is fresh regardless
//! of remaining TTL.

use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use todotracker_core::result::AppResult;

struct Entry<T> {
    data: T,
    expires_at: Instant,
}

/// A process-scoped cache holding one snapshot of type `T`.
///
/// Intended to be wrapped in an `Arc` and injected as a dependency so
/// tests can substitute a fresh instance per run.
pub struct SnapshotCache<T> {
    entry: RwLock<Option<Entry<T>>>,
    refill: Mutex<()>,
    ttl: Duration,
}

impl<T: Clone> SnapshotCache<T> {
    /// Create a cache whose snapshots stay valid for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: RwLock::new(None),
            refill: Mutex::new(()),
            ttl,
        }
    }

    /// Return the cached snapshot if it is still valid.
    pub async fn get(&self) -> Option<T> {
        let guard = self.entry.read().await;
        match guard.as_ref() {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.data.clone()),
            _ => None,
        }
    }

    /// Store a fresh snapshot with a new expiry.
    pub async fn set(&self, data: T) {
        let mut guard = self.entry.write().await;
        *guard = Some(Entry {
            data,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// Drop the snapshot, forcing the next read to refetch.
    pub async fn invalidate(&self) {
        let mut guard = self.entry.write().await;
        *guard = None;
    }

    /// Return the cached snapshot, or fetch and store a fresh one.
    ///
    /// Concurrent misses collapse: only the first caller runs `fetch`,
    /// the rest wait on the refill section and then read the new snapshot.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> AppResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        // Fast path: valid snapshot, no exclusive section.
        if let Some(data) = self.get().await {
            return Ok(data);
        }

        let _refill = self.refill.lock().await;

        // Double-check: another task may have refilled while we waited.
        if let Some(data) = self.get().await {
            return Ok(data);
        }

        debug!("Snapshot cache miss, fetching fresh data");
        let data = fetch().await?;
        self.set(data.clone()).await;
        Ok(data)
    }
}

impl<T> std::fmt::Debug for SnapshotCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_set_get() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        assert_eq!(cache.get().await, None::<Vec<i32>>);

        cache.set(vec![1, 2, 3]).await;
        assert_eq!(cache.get().await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        cache.set(vec![1]).await;
        cache.invalidate().await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = SnapshotCache::new(Duration::from_millis(10));
        cache.set(vec![1]).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn test_get_or_fetch_populates() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let value = cache
            .get_or_fetch(|| async { Ok(vec![7]) })
            .await
            .unwrap();
        assert_eq!(value, vec![7]);
        assert_eq!(cache.get().await, Some(vec![7]));
    }

    #[tokio::test]
    async fn test_concurrent_misses_collapse() {
        let cache = Arc::new(SnapshotCache::new(Duration::from_secs(60)));
        let fetches = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let fetches = Arc::clone(&fetches);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(|| async move {
                        fetches.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok(vec![42])
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), vec![42]);
        }
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }
}
