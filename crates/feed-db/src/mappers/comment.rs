//! Comment entity <-> model mapper

use feed_core::entities::{Comment, NewComment, VoteSummary};
use feed_core::value_objects::Snowflake;

use super::joined_author;
use crate::models::CommentModel;

impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        Comment {
            id: Snowflake::new(model.id),
            post_id: Snowflake::new(model.post_id),
            parent_id: model.parent_id.map(Snowflake::new),
            user_id: Snowflake::new(model.user_id),
            author: joined_author(
                model.author_username,
                model.author_full_name,
                model.author_avatar_url,
            ),
            content: model.content,
            created_at: model.created_at,
            is_pinned: model.is_pinned,
            pinned_by: model.pinned_by.map(Snowflake::new),
            pinned_at: model.pinned_at,
            vote_summary: VoteSummary::default(),
            user_vote: 0,
        }
    }
}

pub struct CommentInsert<'a> {
    pub id: i64,
    pub post_id: i64,
    pub parent_id: Option<i64>,
    pub user_id: i64,
    pub content: &'a str,
}

impl<'a> CommentInsert<'a> {
    pub fn new(comment: &'a NewComment) -> Self {
        Self {
            id: comment.id.into_inner(),
            post_id: comment.post_id.into_inner(),
            parent_id: comment.parent_id.map(Snowflake::into_inner),
            user_id: comment.user_id.into_inner(),
            content: &comment.content,
        }
    }
}
