use async_trait::async_trait;

use crate::application::pagination::{OffsetPage, PageRequest};
use crate::application::repos::{PostsRepo, RepoError};
use crate::domain::entities::PostRecord;
use crate::infra::db::PostgresRepositories;
use crate::infra::db::map_sqlx_error;
use crate::infra::db::util::contains_pattern;

use super::POST_COLUMNS;
use super::types::PostRow;

#[async_trait]
impl PostsRepo for PostgresRepositories {
    async fn list_all(&self) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY id");
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn list_page(&self, page: PageRequest) -> Result<OffsetPage<PostRecord>, RepoError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total = u64::try_from(total)
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))?;

        let offset = i64::try_from(page.offset())
            .map_err(|_| RepoError::InvalidInput {
                message: "page offset out of range".to_string(),
            })?;

        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY id DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(i64::from(page.per_page))
            .bind(offset)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let items = rows.into_iter().map(PostRecord::from).collect();
        Ok(OffsetPage::new(items, total, page))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostRecord>, RepoError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.map(PostRecord::from))
    }

    async fn search_by_title(&self, needle: &str) -> Result<Vec<PostRecord>, RepoError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE title LIKE $1 ESCAPE '\\' ORDER BY id"
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(contains_pattern(needle))
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(PostRecord::from).collect())
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        self.ping().await.map_err(map_sqlx_error)
    }
}
