//! Redis cache store tests against a running Redis server.
//!
//! - Marked `#[ignore]`; run with `cargo test --test live_redis -- --ignored`.
//! - Connects to `POSTCACHE_TEST_REDIS_URL`, falling back to the local default.
//! - Every test works under its own uuid-prefixed keys.

use std::time::Duration;

use bytes::Bytes;
use postcache::application::posts::clear_cache_entry;
use postcache::cache::{CacheStore, RedisCacheStore};
use uuid::Uuid;

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

async fn connect() -> TestResult<RedisCacheStore> {
    let url =
        std::env::var("POSTCACHE_TEST_REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.into());
    Ok(RedisCacheStore::connect(&url).await?)
}

fn unique_key(name: &str) -> String {
    format!("postcache-test:{}:{name}", Uuid::new_v4())
}

#[tokio::test]
#[ignore]
async fn live_redis_set_get_delete() -> TestResult<()> {
    let store = connect().await?;
    let key = unique_key("roundtrip");

    assert!(store.get(&key).await?.is_none());

    store
        .set(&key, Bytes::from_static(br#"{"id":1}"#), Duration::from_secs(60))
        .await?;
    assert_eq!(
        store.get(&key).await?,
        Some(Bytes::from_static(br#"{"id":1}"#))
    );

    assert!(store.delete(&key).await?);
    assert!(!store.delete(&key).await?);
    assert!(store.get(&key).await?.is_none());
    assert_eq!(store.backend(), "redis");
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_redis_entries_expire() -> TestResult<()> {
    let store = connect().await?;
    let key = unique_key("expiry");

    store
        .set(&key, Bytes::from_static(b"soon gone"), Duration::from_secs(1))
        .await?;
    assert!(store.get(&key).await?.is_some());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(store.get(&key).await?.is_none());
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_redis_sub_second_ttl_still_stores() -> TestResult<()> {
    let store = connect().await?;
    let key = unique_key("short");

    store
        .set(&key, Bytes::from_static(b"x"), Duration::from_millis(10))
        .await?;
    assert!(store.get(&key).await?.is_some());

    store.delete(&key).await?;
    Ok(())
}

#[tokio::test]
#[ignore]
async fn live_redis_clear_operation_is_idempotent() -> TestResult<()> {
    let store = connect().await?;
    let key = unique_key("clear");

    store
        .set(&key, Bytes::from_static(b"[]"), Duration::from_secs(60))
        .await?;

    assert!(clear_cache_entry(&store, Some(key.as_str())).await?);
    assert!(!clear_cache_entry(&store, Some(key.as_str())).await?);
    Ok(())
}
