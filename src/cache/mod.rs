//! Post cache.
//!
//! A small key/value store with per-entry TTL sitting in front of the post
//! repository. Reads go through [`through::get_or_compute`]; the backend is
//! either process-local memory or Redis.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! backend = "memory"      # or "redis"
//! redis_url = "redis://127.0.0.1:6379"
//! ttl_seconds = 600
//! invalidate_on_write = false
//! ```

mod config;
mod keys;
mod lock;
mod memory;
mod redis;
mod store;
pub mod through;

pub use config::{CacheConfig, DEFAULT_TTL_SECS};
pub use keys::{ALL_POSTS_KEY, KeyFamily, post_key, require_key};
pub use memory::MemoryCacheStore;
pub use redis::RedisCacheStore;
pub use store::{CacheError, CacheStore, connect};
