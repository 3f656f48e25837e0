//! PostgreSQL implementation of PostRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use feed_core::entities::{NewPost, PinState, Post};
use feed_core::traits::{PageRange, PostRepository, RepoResult};
use feed_core::value_objects::Snowflake;

use crate::mappers::PostInsert;
use crate::models::PostModel;

use super::error::{map_db_error, post_not_found};
use super::id_array;

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_page(&self, range: PageRange) -> RepoResult<Vec<Post>> {
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PostModel>(
            r#"
            SELECT p.id, p.user_id, p.content, p.image_url, p.created_at,
                   p.is_pinned, p.pinned_by, p.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            ORDER BY p.is_pinned DESC, p.pinned_at DESC NULLS LAST, p.created_at DESC, p.id DESC
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(range.from)
        .bind(range.len())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r#"
            SELECT p.id, p.user_id, p.content, p.image_url, p.created_at,
                   p.is_pinned, p.pinned_by, p.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE p.id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Post>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, PostModel>(
            r#"
            SELECT p.id, p.user_id, p.content, p.image_url, p.created_at,
                   p.is_pinned, p.pinned_by, p.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE p.id = ANY($1)
            "#,
        )
        .bind(id_array(ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Post::from).collect())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create(&self, post: &NewPost) -> RepoResult<Post> {
        let insert = PostInsert::new(post);

        let result = sqlx::query_as::<_, PostModel>(
            r#"
            WITH inserted AS (
                INSERT INTO posts (id, user_id, content, image_url)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT p.id, p.user_id, p.content, p.image_url, p.created_at,
                   p.is_pinned, p.pinned_by, p.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM inserted p
            LEFT JOIN users u ON u.id = p.user_id
            "#,
        )
        .bind(insert.id)
        .bind(insert.user_id)
        .bind(insert.content)
        .bind(insert.image_url)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Post::from(result))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(post_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_pin(&self, id: Snowflake, pin: &PinState) -> RepoResult<Post> {
        let result = sqlx::query_as::<_, PostModel>(
            r#"
            WITH updated AS (
                UPDATE posts
                SET is_pinned = $2, pinned_by = $3, pinned_at = $4
                WHERE id = $1
                RETURNING *
            )
            SELECT p.id, p.user_id, p.content, p.image_url, p.created_at,
                   p.is_pinned, p.pinned_by, p.pinned_at,
                   u.username AS author_username,
                   u.full_name AS author_full_name,
                   u.avatar_url AS author_avatar_url
            FROM updated p
            LEFT JOIN users u ON u.id = p.user_id
            "#,
        )
        .bind(id.into_inner())
        .bind(pin.is_pinned)
        .bind(pin.pinned_by.map(Snowflake::into_inner))
        .bind(pin.pinned_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(Post::from).ok_or_else(|| post_not_found(id))
    }
}
