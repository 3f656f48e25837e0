//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use feed_core::entities::{Comment, NewComment, PinState};
use feed_core::error::DomainError;
use feed_core::traits::{CommentRepository, RepoResult};
use feed_core::value_objects::Snowflake;

use crate::mappers::CommentInsert;
use crate::models::CommentModel;

use super::error::{comment_not_found, map_db_error};

#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn find_by_post(&self, post_id: Snowflake) -> RepoResult<Vec<Comment>> {
        let results = sqlx::query_as::<_, CommentModel>(
            r#"
            SELECT c.id, c.post_id, c.parent_id, c.user_id, c.content, c.created_at,
                   c.is_pinned, c.pinned_by, c.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM comments c
            LEFT JOIN users u ON u.id = c.user_id
            WHERE c.post_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(post_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Comment::from).collect())
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id, post_id = %comment.post_id))]
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        let insert = CommentInsert::new(comment);

        let result = sqlx::query_as::<_, CommentModel>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (id, post_id, parent_id, user_id, content)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT c.id, c.post_id, c.parent_id, c.user_id, c.content, c.created_at,
                   c.is_pinned, c.pinned_by, c.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM inserted c
            LEFT JOIN users u ON u.id = c.user_id
            "#,
        )
        .bind(insert.id)
        .bind(insert.post_id)
        .bind(insert.parent_id)
        .bind(insert.user_id)
        .bind(insert.content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A dangling post_id or parent_id is a caller error
            let dangling = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_foreign_key_violation());
            if dangling {
                DomainError::PostNotFound(comment.post_id)
            } else {
                map_db_error(e)
            }
        })?;

        Ok(Comment::from(result))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_pin(&self, id: Snowflake, pin: &PinState) -> RepoResult<Comment> {
        let result = sqlx::query_as::<_, CommentModel>(
            r#"
            WITH updated AS (
                UPDATE comments
                SET is_pinned = $2, pinned_by = $3, pinned_at = $4
                WHERE id = $1
                RETURNING *
            )
            SELECT c.id, c.post_id, c.parent_id, c.user_id, c.content, c.created_at,
                   c.is_pinned, c.pinned_by, c.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM updated c
            LEFT JOIN users u ON u.id = c.user_id
            "#,
        )
        .bind(id.into_inner())
        .bind(pin.is_pinned)
        .bind(pin.pinned_by.map(Snowflake::into_inner))
        .bind(pin.pinned_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Comment::from).ok_or_else(|| comment_not_found(id))
    }

    #[instrument(skip(self))]
    async fn count_by_post(&self, post_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM comments WHERE post_id = $1
            "#,
        )
        .bind(post_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
