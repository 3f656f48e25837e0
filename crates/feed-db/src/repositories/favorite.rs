//! PostgreSQL implementation of FavoriteRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use feed_core::entities::Favorite;
use feed_core::traits::{FavoriteRepository, RepoResult};
use feed_core::value_objects::Snowflake;

use crate::models::FavoriteModel;

use super::error::map_db_error;
use super::id_array;

#[derive(Clone)]
pub struct PgFavoriteRepository {
    pool: PgPool,
}

impl PgFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for PgFavoriteRepository {
    #[instrument(skip(self, post_ids), fields(count = post_ids.len()))]
    async fn find_for_posts(
        &self,
        user_id: Snowflake,
        post_ids: &[Snowflake],
    ) -> RepoResult<Vec<Favorite>> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, FavoriteModel>(
            r#"
            SELECT post_id, user_id, created_at
            FROM favorite_posts
            WHERE user_id = $1 AND post_id = ANY($2)
            "#,
        )
        .bind(user_id.into_inner())
        .bind(id_array(post_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Favorite::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Favorite>> {
        let results = sqlx::query_as::<_, FavoriteModel>(
            r#"
            SELECT post_id, user_id, created_at
            FROM favorite_posts
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Favorite::from).collect())
    }

    #[instrument(skip(self))]
    async fn create(&self, favorite: &Favorite) -> RepoResult<Favorite> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let result = sqlx::query_as::<_, FavoriteModel>(
            r#"
            INSERT INTO favorite_posts (post_id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (post_id, user_id) DO UPDATE SET post_id = EXCLUDED.post_id
            RETURNING post_id, user_id, created_at
            "#,
        )
        .bind(favorite.post_id.into_inner())
        .bind(favorite.user_id.into_inner())
        .bind(favorite.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Favorite::from(result))
    }

    #[instrument(skip(self))]
    async fn delete(&self, post_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r#"
            DELETE FROM favorite_posts WHERE post_id = $1 AND user_id = $2
            "#,
        )
        .bind(post_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
