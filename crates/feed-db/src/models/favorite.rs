//! Favorite database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct FavoriteModel {
    pub post_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
