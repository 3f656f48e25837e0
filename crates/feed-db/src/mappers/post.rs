//! Post entity <-> model mapper

use feed_core::entities::{NewPost, Post, VoteSummary};
use feed_core::value_objects::Snowflake;

use super::joined_author;
use crate::models::PostModel;

/// Convert PostModel to Post entity; viewer-relative fields start neutral
impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: Snowflake::new(model.id),
            user_id: Snowflake::new(model.user_id),
            author: joined_author(
                model.author_username,
                model.author_full_name,
                model.author_avatar_url,
            ),
            content: model.content,
            image_url: model.image_url,
            created_at: model.created_at,
            is_pinned: model.is_pinned,
            pinned_by: model.pinned_by.map(Snowflake::new),
            pinned_at: model.pinned_at,
            vote_summary: VoteSummary::default(),
            user_vote: 0,
            is_favorited: false,
            favorited_at: None,
        }
    }
}

pub struct PostInsert<'a> {
    pub id: i64,
    pub user_id: i64,
    pub content: &'a str,
    pub image_url: Option<&'a str>,
}

impl<'a> PostInsert<'a> {
    pub fn new(post: &'a NewPost) -> Self {
        Self {
            id: post.id.into_inner(),
            user_id: post.user_id.into_inner(),
            content: &post.content,
            image_url: post.image_url.as_deref(),
        }
    }
}
