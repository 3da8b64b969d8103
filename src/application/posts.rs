//! Post use cases: cached reads, uncached search and paging, and writes.
//!
//! Updates and deletes always drop the `post::<id>` entry of the post they
//! touch. The `all_post` list is only dropped when `invalidate_on_write` is
//! set, so a cached list may lag behind the database for up to one TTL.

use std::sync::Arc;

use metrics::counter;
use serde_json::Value;
use tracing::{info, warn};

use crate::application::error::AppError;
use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::repos::{PostsRepo, PostsWriteRepo, RepoError};
use crate::cache::{
    ALL_POSTS_KEY, CacheConfig, CacheStore, KeyFamily, post_key, require_key,
    through::{get_or_compute, get_or_compute_present},
};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{NewPost, PostPatch};

pub const METRIC_CACHE_CLEAR: &str = "postcache_cache_clear_total";

/// Raw create input as received from a client.
#[derive(Debug, Clone, Default)]
pub struct CreatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Raw update input. Absent fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostCommand {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Clone)]
pub struct PostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    cache: Arc<dyn CacheStore>,
    config: CacheConfig,
}

impl PostService {
    pub fn new(
        reader: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        cache: Arc<dyn CacheStore>,
        config: CacheConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Every post, served from `all_post` when cached.
    pub async fn list_all(&self) -> Result<Vec<PostRecord>, AppError> {
        let reader = self.reader.clone();
        get_or_compute(self.cache.as_ref(), ALL_POSTS_KEY, self.config.ttl, || async move {
            reader.list_all().await.map_err(AppError::from)
        })
        .await
    }

    /// One post, served from `post::<id>` when cached. Absent posts are not cached.
    pub async fn show(&self, id: i64) -> Result<PostRecord, AppError> {
        let reader = self.reader.clone();
        let key = post_key(id);
        get_or_compute_present(self.cache.as_ref(), &key, self.config.ttl, || async move {
            reader.find_by_id(id).await.map_err(AppError::from)
        })
        .await?
        .ok_or_else(AppError::post_not_found)
    }

    /// Uncached existence check.
    pub async fn require(&self, id: i64) -> Result<PostRecord, AppError> {
        self.reader
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::post_not_found)
    }

    /// Posts whose title contains `needle`. Always read from the database.
    pub async fn search(&self, needle: Option<&str>) -> Result<Vec<PostRecord>, AppError> {
        let needle = needle.unwrap_or_default();
        Ok(self.reader.search_by_title(needle).await?)
    }

    pub async fn paged(&self, request: PageRequest) -> Result<OffsetPage<PostRecord>, AppError> {
        Ok(self.reader.list_page(request).await?)
    }

    pub async fn create(&self, command: CreatePostCommand) -> Result<PostRecord, AppError> {
        let post = NewPost::parse(command.title, command.content)?;
        let record = self.writer.create_post(post).await?;

        info!(
            target = "application::posts::create",
            post_id = record.id,
            "post created"
        );

        self.invalidate_list().await;
        Ok(record)
    }

    /// Existence is checked before the input is validated. An update that
    /// supplies no fields returns the stored record untouched.
    pub async fn update(&self, id: i64, command: UpdatePostCommand) -> Result<PostRecord, AppError> {
        let current = self.require(id).await?;

        let patch = PostPatch::parse(command.title, command.content)?;
        if patch.is_empty() {
            return Ok(current);
        }

        let record = self.writer.update_post(id, patch).await.map_err(not_found)?;

        info!(
            target = "application::posts::update",
            post_id = record.id,
            "post updated"
        );

        self.evict(&post_key(id)).await;
        self.invalidate_list().await;
        Ok(record)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.writer.delete_post(id).await.map_err(not_found)?;

        info!(
            target = "application::posts::delete",
            post_id = id,
            "post deleted"
        );

        self.evict(&post_key(id)).await;
        self.invalidate_list().await;
        Ok(())
    }

    /// Current value under `key`, decoded as JSON where possible.
    ///
    /// Returns `None` for absent, expired or empty entries. Payloads that are
    /// not JSON come back as a JSON string.
    pub async fn cached_value(&self, key: Option<&str>) -> Result<Option<Value>, AppError> {
        let key = require_key(key)?;
        let bytes = match self.cache.get(&key).await? {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return Ok(None),
        };

        let value = serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Ok(Some(value))
    }

    /// Remove the entry under `key`. Returns whether a live entry existed.
    pub async fn clear_cache(&self, key: Option<&str>) -> Result<bool, AppError> {
        clear_cache_entry(self.cache.as_ref(), key).await
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        Ok(self.reader.health_check().await?)
    }

    async fn invalidate_list(&self) {
        if self.config.invalidate_on_write {
            self.evict(ALL_POSTS_KEY).await;
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(err) = self.cache.delete(key).await {
            warn!(
                target = "application::posts::invalidate",
                key = %key,
                error = %err,
                "failed to invalidate cache entry"
            );
        }
    }
}

/// Clear one client-named cache entry. Shared by the HTTP surface and the
/// `clear-cache` command.
pub async fn clear_cache_entry(
    store: &dyn CacheStore,
    key: Option<&str>,
) -> Result<bool, AppError> {
    let key = require_key(key)?;
    let removed = store.delete(&key).await?;

    counter!(METRIC_CACHE_CLEAR, "family" => KeyFamily::of(&key).as_str()).increment(1);
    info!(
        target = "application::posts::clear_cache",
        key = %key,
        backend = store.backend(),
        removed,
        "cache entry cleared"
    );

    Ok(removed)
}

fn not_found(err: RepoError) -> AppError {
    match err {
        RepoError::NotFound => AppError::post_not_found(),
        other => AppError::Repo(other),
    }
}
