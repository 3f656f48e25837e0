//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: i64,
    pub entity_id: i64,
    pub entity_type: String,
    pub user_id: i64,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}
