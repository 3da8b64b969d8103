#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use http_body_util::BodyExt;
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;

use postcache::application::pagination::{OffsetPage, PageRequest};
use postcache::application::posts::PostService;
use postcache::application::repos::{PostsRepo, PostsWriteRepo, RepoError};
use postcache::cache::{CacheConfig, MemoryCacheStore};
use postcache::domain::entities::PostRecord;
use postcache::domain::posts::{NewPost, PostPatch};
use postcache::infra::http::{ApiState, build_router};

/// Posts table stand-in. Counts reads so tests can tell cache hits from misses.
#[derive(Default)]
pub struct InMemoryPosts {
    rows: Mutex<Vec<PostRecord>>,
    next_id: AtomicUsize,
    pub list_calls: AtomicUsize,
    pub find_calls: AtomicUsize,
    pub unhealthy: AtomicBool,
}

impl InMemoryPosts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Insert directly, bypassing the service and its cache.
    pub async fn seed(&self, title: &str, content: &str) -> PostRecord {
        self.create_post(NewPost {
            title: title.to_string(),
            content: content.to_string(),
        })
        .await
        .expect("seed insert")
    }

    pub async fn rename(&self, id: i64, title: &str) {
        let mut rows = self.rows.lock().await;
        let row = rows.iter_mut().find(|row| row.id == id).expect("row exists");
        row.title = title.to_string();
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }
}

#[async_trait]
impl PostsRepo for InMemoryPosts {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().await.clone())
    }

    async fn list_page(&self, page: PageRequest) -> Result<OffsetPage<PostRecord>, RepoError> {
        let rows = self.rows.lock().await;
        let total = rows.len() as u64;
        let items = rows
            .iter()
            .rev()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .cloned()
            .collect();
        Ok(OffsetPage::new(items, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().await.iter().find(|row| row.id == id).cloned())
    }

    async fn search_by_title(&self, needle: &str) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self
            .rows
            .lock()
            .await
            .iter()
            .filter(|row| row.title.contains(needle))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryPosts {
    async fn create_post(&self, post: NewPost) -> Result<PostRecord, RepoError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64 + 1;
        let now = OffsetDateTime::now_utc();
        let record = PostRecord {
            id,
            title: post.title,
            content: post.content,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().await.push(record.clone());
        Ok(record)
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<PostRecord, RepoError> {
        let mut rows = self.rows.lock().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepoError::NotFound)?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(content) = patch.content {
            row.content = content;
        }
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub posts: Arc<InMemoryPosts>,
    pub cache: Arc<MemoryCacheStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        let posts = InMemoryPosts::new();
        let cache = Arc::new(MemoryCacheStore::new());
        let service = PostService::new(posts.clone(), posts.clone(), cache.clone(), config);
        let router = build_router(ApiState::new(service));
        Self {
            router,
            posts,
            cache,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, None).await
    }

    /// JSON request with `content-type: application/json`.
    pub async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            method,
            uri,
            Some("application/json"),
            Some(body.to_string()),
        )
        .await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        let request = builder
            .body(body.map(Body::from).unwrap_or_else(Body::empty))
            .expect("request should build");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        (status, value)
    }
}
