//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{NewPost, PostPatch};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    /// Every row, in insertion order. No pagination is applied.
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError>;

    /// Newest first.
    async fn list_page(&self, page: PageRequest) -> Result<OffsetPage<PostRecord>, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError>;

    /// Rows whose title contains `needle` anywhere. An empty needle matches all rows.
    async fn search_by_title(&self, needle: &str) -> Result<Vec<PostRecord>, RepoError>;

    async fn health_check(&self) -> Result<(), RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(&self, post: NewPost) -> Result<PostRecord, RepoError>;

    /// Applies the supplied fields and bumps `updated_at`.
    /// Returns [`RepoError::NotFound`] when the row does not exist.
    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<PostRecord, RepoError>;

    /// Returns [`RepoError::NotFound`] when no row was deleted.
    async fn delete_post(&self, id: i64) -> Result<(), RepoError>;
}
