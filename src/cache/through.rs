//! Cache-through reads.
//!
//! A lookup consults the store first; on a miss the caller's compute function
//! runs and its result is written back with the given TTL. There is no locking
//! between concurrent misses on the same key: each one computes and writes, and
//! the last write wins.

use std::{future::Future, time::Duration, time::Instant};

use bytes::Bytes;
use metrics::{counter, histogram};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::keys::KeyFamily;
use super::store::{CacheError, CacheStore};

pub const METRIC_CACHE_HIT: &str = "postcache_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "postcache_cache_miss_total";
pub const METRIC_CACHE_COMPUTE_MS: &str = "postcache_cache_compute_ms";

/// Return the cached value under `key`, or compute, store and return it.
pub async fn get_or_compute<T, E, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: From<CacheError>,
{
    if let Some(cached) = lookup(store, key).await? {
        return Ok(cached);
    }

    let value = timed_compute(key, compute).await?;
    write(store, key, &value, ttl).await?;
    Ok(value)
}

/// Like [`get_or_compute`] for lookups that may find nothing.
///
/// `None` results are returned as-is and never written to the store.
pub async fn get_or_compute_present<T, E, F, Fut>(
    store: &dyn CacheStore,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<Option<T>, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: From<CacheError>,
{
    if let Some(cached) = lookup(store, key).await? {
        return Ok(Some(cached));
    }

    let value = timed_compute(key, compute).await?;
    if let Some(value) = value.as_ref() {
        write(store, key, value, ttl).await?;
    }
    Ok(value)
}

/// Decode the entry under `key`.
///
/// Empty payloads and payloads that no longer decode as `T` count as misses.
pub async fn lookup<T>(store: &dyn CacheStore, key: &str) -> Result<Option<T>, CacheError>
where
    T: DeserializeOwned,
{
    let family = KeyFamily::of(key).as_str();

    let decoded = match store.get(key).await? {
        Some(bytes) if !bytes.is_empty() => match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    target = "postcache::cache",
                    cache = family,
                    key,
                    error = %err,
                    "Discarding undecodable cache entry"
                );
                None
            }
        },
        _ => None,
    };

    if decoded.is_some() {
        debug!(cache = family, key, outcome = "hit", "cache lookup");
        counter!(METRIC_CACHE_HIT, "family" => family).increment(1);
    } else {
        debug!(cache = family, key, outcome = "miss", "cache lookup");
        counter!(METRIC_CACHE_MISS, "family" => family).increment(1);
    }

    Ok(decoded)
}

/// Serialize `value` as JSON and store it under `key`.
pub async fn write<T>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), CacheError>
where
    T: Serialize,
{
    let payload = serde_json::to_vec(value)?;
    store.set(key, Bytes::from(payload), ttl).await
}

async fn timed_compute<T, F, Fut>(key: &str, compute: F) -> T
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let started_at = Instant::now();
    let value = compute().await;
    histogram!(METRIC_CACHE_COMPUTE_MS, "family" => KeyFamily::of(key).as_str())
        .record(started_at.elapsed().as_secs_f64() * 1000.0);
    value
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::memory::MemoryCacheStore;

    const TTL: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn miss_computes_and_stores_then_hit_skips_compute() {
        let store = MemoryCacheStore::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: Vec<u32> = get_or_compute(&store, "all_post", TTL, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CacheError>(vec![1, 2, 3])
            })
            .await
            .unwrap();
            assert_eq!(value, vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_recomputed() {
        let store = MemoryCacheStore::new();
        let first: u32 = get_or_compute(&store, "k", TTL, || async { Ok::<_, CacheError>(1) })
            .await
            .unwrap();
        assert_eq!(first, 1);

        tokio::time::advance(TTL).await;

        let second: u32 = get_or_compute(&store, "k", TTL, || async { Ok::<_, CacheError>(2) })
            .await
            .unwrap();
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn compute_errors_are_not_cached() {
        let store = MemoryCacheStore::new();
        let result: Result<u32, CacheError> = get_or_compute(&store, "k", TTL, || async {
            Err(CacheError::backend("storage down"))
        })
        .await;
        assert!(result.is_err());
        assert!(store.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn absent_results_are_not_cached() {
        let store = MemoryCacheStore::new();
        let value: Option<u32> =
            get_or_compute_present(&store, "post::9", TTL, || async { Ok::<_, CacheError>(None) })
                .await
                .unwrap();
        assert!(value.is_none());
        assert!(store.get("post::9").await.unwrap().is_none());

        let value: Option<u32> = get_or_compute_present(&store, "post::9", TTL, || async {
            Ok::<_, CacheError>(Some(9))
        })
        .await
        .unwrap();
        assert_eq!(value, Some(9));
        assert_eq!(lookup::<u32>(&store, "post::9").await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn empty_or_foreign_payloads_count_as_misses() {
        let store = MemoryCacheStore::new();
        store.set("k", Bytes::new(), TTL).await.unwrap();
        assert!(lookup::<u32>(&store, "k").await.unwrap().is_none());

        store
            .set("k", Bytes::from_static(b"not json"), TTL)
            .await
            .unwrap();
        let value: u32 = get_or_compute(&store, "k", TTL, || async { Ok::<_, CacheError>(5) })
            .await
            .unwrap();
        assert_eq!(value, 5);
        assert_eq!(lookup::<u32>(&store, "k").await.unwrap(), Some(5));
    }
}
