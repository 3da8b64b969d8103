//! The Cache Store capability.
//!
//! Values are opaque bytes with a per-entry time-to-live. The service only ever
//! writes JSON, but the store itself makes no assumption about the payload.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::config::CacheBackend;

use super::{config::CacheConfig, memory::MemoryCacheStore, redis::RedisCacheStore};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache key missing.")]
    MissingKey,
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError>;

    /// Returns whether an entry was removed. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    /// Short backend label for logs.
    fn backend(&self) -> &'static str;
}

/// Build the store selected by configuration.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    let store: Arc<dyn CacheStore> = match &config.backend {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
        CacheBackend::Redis { url } => Arc::new(RedisCacheStore::connect(url).await?),
    };

    info!(
        target = "postcache::cache",
        backend = store.backend(),
        ttl_secs = config.ttl.as_secs(),
        invalidate_on_write = config.invalidate_on_write,
        "Cache store ready"
    );

    Ok(store)
}
