//! Vote database model

use sqlx::FromRow;

/// Row of `post_votes` or `comment_votes`; the entity column is aliased to `entity_id`
#[derive(Debug, Clone, FromRow)]
pub struct VoteModel {
    pub entity_id: i64,
    pub user_id: i64,
    pub value: i16,
}
