//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use feed_core::entities::Reaction;
use feed_core::error::DomainError;
use feed_core::traits::{ReactionRepository, RepoResult};
use feed_core::value_objects::{EntityType, Snowflake};

use crate::mappers::ReactionInsert;
use crate::models::ReactionModel;

use super::error::{map_db_error, map_unique_violation};
use super::id_array;

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
    ) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT id, entity_id, entity_type, user_id, emoji, created_at
            FROM reactions
            WHERE entity_type = $1 AND entity_id = $2
            ORDER BY created_at
            "#,
        )
        .bind(entity_type.as_str())
        .bind(entity_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Reaction::try_from).collect()
    }

    #[instrument(skip(self, entity_ids), fields(count = entity_ids.len()))]
    async fn find_by_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[Snowflake],
    ) -> RepoResult<Vec<Reaction>> {
        if entity_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT id, entity_id, entity_type, user_id, emoji, created_at
            FROM reactions
            WHERE entity_type = $1 AND entity_id = ANY($2)
            ORDER BY created_at
            "#,
        )
        .bind(entity_type.as_str())
        .bind(id_array(entity_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(Reaction::try_from).collect()
    }

    #[instrument(skip(self, reaction), fields(entity_id = %reaction.entity_id, emoji = %reaction.emoji))]
    async fn create(&self, reaction: &Reaction) -> RepoResult<()> {
        let insert = ReactionInsert::new(reaction);

        sqlx::query(
            r#"
            INSERT INTO reactions (id, entity_id, entity_type, user_id, emoji, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(insert.id)
        .bind(insert.entity_id)
        .bind(insert.entity_type)
        .bind(insert.user_id)
        .bind(insert.emoji)
        .bind(reaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::ReactionAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<()> {
        sqlx::query(
            r#"
            DELETE FROM reactions
            WHERE entity_type = $1 AND entity_id = $2 AND user_id = $3 AND emoji = $4
            "#,
        )
        .bind(entity_type.as_str())
        .bind(entity_id.into_inner())
        .bind(user_id.into_inner())
        .bind(emoji)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }
}
