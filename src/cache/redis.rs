//! Redis-backed Cache Store.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::{AsyncCommands, Client, aio::ConnectionManager};

use super::store::{CacheError, CacheStore};

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::backend(err)
    }
}

/// Cache Store over a multiplexed, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: ConnectionManager,
}

impl RedisCacheStore {
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut connection = self.connection.clone();
        let value: Option<Vec<u8>> = connection.get(key).await?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let mut connection = self.connection.clone();
        // EX 0 is rejected by Redis.
        let seconds = ttl.as_secs().max(1);
        connection
            .set_ex::<_, _, ()>(key, value.to_vec(), seconds)
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let mut connection = self.connection.clone();
        let removed: i64 = connection.del(key).await?;
        Ok(removed > 0)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
