//! Post database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of `posts` with the author's display columns left-joined from `users`
#[derive(Debug, Clone, FromRow)]
pub struct PostModel {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub pinned_by: Option<i64>,
    pub pinned_at: Option<DateTime<Utc>>,
    pub author_username: Option<String>,
    pub author_full_name: Option<String>,
    pub author_avatar_url: Option<String>,
}
