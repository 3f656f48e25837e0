//! PostgreSQL implementation of VoteRepository over `post_votes` and `comment_votes`

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use feed_core::entities::Vote;
use feed_core::traits::{RepoResult, VoteRepository};
use feed_core::value_objects::{EntityType, Snowflake};

use crate::models::VoteModel;

use super::error::map_db_error;
use super::id_array;

/// Statements for one vote table
struct VoteTable {
    select: &'static str,
    upsert: &'static str,
    delete: &'static str,
}

const POST_VOTES: VoteTable = VoteTable {
    select: r#"
        SELECT post_id AS entity_id, user_id, value
        FROM post_votes
        WHERE post_id = ANY($1)
    "#,
    upsert: r#"
        INSERT INTO post_votes (post_id, user_id, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (post_id, user_id) DO UPDATE SET value = EXCLUDED.value
    "#,
    delete: r#"
        DELETE FROM post_votes WHERE post_id = $1 AND user_id = $2
    "#,
};

const COMMENT_VOTES: VoteTable = VoteTable {
    select: r#"
        SELECT comment_id AS entity_id, user_id, value
        FROM comment_votes
        WHERE comment_id = ANY($1)
    "#,
    upsert: r#"
        INSERT INTO comment_votes (comment_id, user_id, value)
        VALUES ($1, $2, $3)
        ON CONFLICT (comment_id, user_id) DO UPDATE SET value = EXCLUDED.value
    "#,
    delete: r#"
        DELETE FROM comment_votes WHERE comment_id = $1 AND user_id = $2
    "#,
};

fn table_for(entity_type: EntityType) -> &'static VoteTable {
    match entity_type {
        EntityType::Post => &POST_VOTES,
        EntityType::Comment => &COMMENT_VOTES,
    }
}

#[derive(Clone)]
pub struct PgVoteRepository {
    pool: PgPool,
}

impl PgVoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    #[instrument(skip(self, entity_ids), fields(count = entity_ids.len()))]
    async fn find_by_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[Snowflake],
    ) -> RepoResult<Vec<Vote>> {
        if entity_ids.is_empty() {
            return Ok(Vec::new());
        }

        let results = sqlx::query_as::<_, VoteModel>(table_for(entity_type).select)
            .bind(id_array(entity_ids))
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        results.into_iter().map(Vote::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn upsert(&self, entity_type: EntityType, vote: &Vote) -> RepoResult<()> {
        sqlx::query(table_for(entity_type).upsert)
            .bind(vote.entity_id.into_inner())
            .bind(vote.user_id.into_inner())
            .bind(vote.value.as_i16())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<()> {
        sqlx::query(table_for(entity_type).delete)
            .bind(entity_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
