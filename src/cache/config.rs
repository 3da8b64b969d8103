//! Cache configuration.
//!
//! Resolved from the `[cache]` section of the service settings.

use std::time::Duration;

use crate::config::{CacheBackend, CacheSettings};

pub const DEFAULT_TTL_SECS: u64 = 600;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Where cache entries live.
    pub backend: CacheBackend,
    /// Lifetime of every entry the service writes.
    pub ttl: Duration,
    /// Also drop `all_post` after successful writes.
    pub invalidate_on_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            invalidate_on_write: false,
        }
    }
}

impl CacheConfig {
    /// Whether entries live only inside this process.
    pub fn is_process_local(&self) -> bool {
        matches!(self.backend, CacheBackend::Memory)
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            backend: settings.backend.clone(),
            ttl: settings.ttl,
            invalidate_on_write: settings.invalidate_on_write,
        }
    }
}
