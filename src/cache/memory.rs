//! Process-local Cache Store.
//!
//! Expiry uses Tokio's clock so tests can drive it with a paused runtime.
//! Expired entries are invisible to readers and removed on the next touch.

use std::{collections::HashMap, sync::RwLock, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::time::Instant;

use super::lock::{rw_read, rw_write};
use super::store::{CacheError, CacheStore};

const SOURCE: &str = "cache::memory";
const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

#[derive(Clone)]
struct MemoryEntry {
    value: Bytes,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, MemoryEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        rw_read(&self.entries, SOURCE, "len")
            .values()
            .filter(|entry| entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        rw_write(&self.entries, SOURCE, "purge_expired").retain(|_, entry| entry.is_live(now));
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let now = Instant::now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = rw_write(&self.entries, SOURCE, "get.evict");
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let now = Instant::now();
        let entry = MemoryEntry {
            value,
            expires_at: now.checked_add(ttl).unwrap_or(now + MAX_TTL),
        };
        rw_write(&self.entries, SOURCE, "set").insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let removed = rw_write(&self.entries, SOURCE, "delete").remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
