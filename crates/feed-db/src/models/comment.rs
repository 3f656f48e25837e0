//! Comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub pinned_by: Option<i64>,
    pub pinned_at: Option<DateTime<Utc>>,
    pub author_username: Option<String>,
    pub author_full_name: Option<String>,
    pub author_avatar_url: Option<String>,
}
