//! Memoizing data source wrapper
//!
//! Each `(query, limit)` key owns a `OnceCell`. The first caller for a key
//! performs the fetch; concurrent callers for the same key wait on the same
//! cell instead of issuing duplicate requests. A failed fetch drops its slot
//! so the next caller retries. With a TTL, expired entries are swept on every
//! lookup.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;
use crate::models::{Query, Record};

use super::DataSource;

type Slot = Arc<OnceCell<(Instant, Arc<Vec<Record>>)>>;
type Key = (Query, usize);

/// Cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub requests: u64,
    pub misses: u64,
}

/// Data source wrapper that memoizes successful fetches
pub struct CachedSource<S> {
    inner: S,
    ttl: Option<Duration>,
    slots: Mutex<HashMap<Key, Slot>>,
    requests: AtomicU64,
    misses: AtomicU64,
}

impl<S: DataSource> CachedSource<S> {
    /// Cache entries forever
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, None)
    }

    /// Cache entries for at most `ttl` (`None` = forever)
    pub fn with_ttl(inner: S, ttl: Option<Duration>) -> Self {
        Self {
            inner,
            ttl,
            slots: Mutex::new(HashMap::new()),
            requests: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Drop every cached entry
    pub async fn clear(&self) {
        self.slots.lock().await.clear();
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.slots.lock().await.len(),
            requests: self.requests.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    async fn slot_for(&self, key: &Key) -> Slot {
        let mut slots = self.slots.lock().await;
        if let Some(ttl) = self.ttl {
            let before = slots.len();
            slots.retain(|_, slot| match slot.get() {
                Some((stored_at, _)) => stored_at.elapsed() < ttl,
                None => true,
            });
            let swept = before - slots.len();
            if swept > 0 {
                tracing::debug!(swept, "Expired cache entries dropped");
            }
        }
        slots.entry(key.clone()).or_default().clone()
    }

    /// Forget a slot whose fetch failed, unless another caller replaced it
    async fn discard(&self, key: &Key, slot: &Slot) {
        let mut slots = self.slots.lock().await;
        let stale = slots
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && !current.initialized());
        if stale {
            slots.remove(key);
        }
    }
}

#[async_trait]
impl<S: DataSource> DataSource for CachedSource<S> {
    async fn fetch(&self, query: &Query, limit: usize) -> Result<Vec<Record>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let key = (query.clone(), limit);
        let slot = self.slot_for(&key).await;

        let result = slot
            .get_or_try_init(|| async {
                self.misses.fetch_add(1, Ordering::Relaxed);
                let records = self.inner.fetch(query, limit).await?;
                Ok::<_, crate::error::Error>((Instant::now(), Arc::new(records)))
            })
            .await;

        match result {
            Ok((_, records)) => Ok(records.as_ref().clone()),
            Err(e) => {
                self.discard(&key, &slot).await;
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::AtomicUsize;

    /// Counts calls and optionally fails the first N of them
    struct CountingSource {
        calls: AtomicUsize,
        fail_first: usize,
    }

    impl CountingSource {
        fn new(fail_first: usize) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_first,
            }
        }
    }

    #[async_trait]
    impl DataSource for CountingSource {
        async fn fetch(&self, query: &Query, _limit: usize) -> Result<Vec<Record>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            if call < self.fail_first {
                return Err(Error::Upstream {
                    status: 502,
                    message: "bad gateway".into(),
                });
            }
            Ok(vec![Record {
                topic: query.get("topic").map(String::from),
                ..Default::default()
            }])
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_hit_returns_same_records() {
        let cache = CachedSource::new(CountingSource::new(0));
        let query = Query::new().topic("Tobacco");

        let first = cache.fetch(&query, 10).await.unwrap();
        let second = cache.fetch(&query, 10).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.requests, 2);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_separately() {
        let cache = CachedSource::new(CountingSource::new(0));
        cache.fetch(&Query::new().topic("A"), 10).await.unwrap();
        cache.fetch(&Query::new().topic("B"), 10).await.unwrap();
        cache.fetch(&Query::new().topic("A"), 20).await.unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_fetch() {
        let cache = Arc::new(CachedSource::new(CountingSource::new(0)));
        let query = Query::new().topic("Cancer");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let query = query.clone();
                tokio::spawn(async move { cache.fetch(&query, 10).await.unwrap() })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap().len(), 1);
        }

        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = CachedSource::new(CountingSource::new(1));
        let query = Query::new().topic("Diabetes");

        assert!(cache.fetch(&query, 10).await.is_err());
        assert_eq!(cache.fetch(&query, 10).await.unwrap().len(), 1);
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let cache = CachedSource::with_ttl(CountingSource::new(0), Some(Duration::ZERO));
        let query = Query::new().topic("Diabetes");

        cache.fetch(&query, 10).await.unwrap();
        cache.fetch(&query, 10).await.unwrap();
        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_values_containing_separators_do_not_collide() {
        use crate::source::InMemorySource;
        use crate::test_utils::sample_record;

        let rows = || {
            vec![sample_record(
                "OH",
                "Ohio",
                2021,
                "Diabetes",
                "Prevalence",
                "11.2",
            )]
        };
        let source = InMemorySource::new(rows());
        let cache = CachedSource::new(InMemorySource::new(rows()));

        let crafted = Query::new().question("Prevalence&topic=Diabetes");
        assert!(cache.fetch(&crafted, 10).await.unwrap().is_empty());

        let query = Query::new().question("Prevalence").topic("Diabetes");
        let via_cache = cache.fetch(&query, 10).await.unwrap();
        let via_source = source.fetch(&query, 10).await.unwrap();
        assert_eq!(via_cache.len(), 1);
        assert_eq!(via_cache, via_source);
        assert_eq!(cache.stats().await.entries, 2);
    }

    #[tokio::test]
    async fn test_failed_fetches_leave_no_entries() {
        let cache = CachedSource::with_ttl(CountingSource::new(usize::MAX), Some(Duration::ZERO));

        for i in 0..50 {
            let query = Query::new().topic(&format!("Topic {}", i));
            assert!(cache.fetch(&query, 10).await.is_err());
        }

        let stats = cache.stats().await;
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.misses, 50);
    }

    #[tokio::test]
    async fn test_expired_entries_are_swept_on_lookup() {
        let cache = CachedSource::with_ttl(CountingSource::new(0), Some(Duration::ZERO));

        cache.fetch(&Query::new().topic("A"), 10).await.unwrap();
        cache.fetch(&Query::new().topic("B"), 10).await.unwrap();
        cache.fetch(&Query::new().topic("C"), 10).await.unwrap();

        assert_eq!(cache.stats().await.entries, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = CachedSource::new(CountingSource::new(0));
        cache.fetch(&Query::new(), 10).await.unwrap();
        cache.clear().await;
        assert_eq!(cache.stats().await.entries, 0);
    }
}
