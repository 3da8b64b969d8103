use async_trait::async_trait;

use crate::application::repos::{PostsWriteRepo, RepoError};
use crate::domain::entities::PostRecord;
use crate::domain::posts::{NewPost, PostPatch};
use crate::infra::db::PostgresRepositories;
use crate::infra::db::map_sqlx_error;

use super::POST_COLUMNS;
use super::types::PostRow;

#[async_trait]
impl PostsWriteRepo for PostgresRepositories {
    async fn create_post(&self, post: NewPost) -> Result<PostRecord, RepoError> {
        let sql = format!(
            "INSERT INTO posts (title, content) VALUES ($1, $2) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post.title)
            .bind(post.content)
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<PostRecord, RepoError> {
        let sql = format!(
            "UPDATE posts \
             SET title = COALESCE($2, title), content = COALESCE($3, content), updated_at = now() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.content)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        row.map(PostRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete_post(&self, id: i64) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}
