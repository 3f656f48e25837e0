//! Comment entity - a reply under a post, threaded by parent linkage

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decoration::Decoration;
use super::vote::VoteSummary;
use super::{Author, FeedEntity, PinState};
use crate::value_objects::Snowflake;

/// Comment as held by a thread cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub parent_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub author: Option<Author>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub pinned_by: Option<Snowflake>,
    pub pinned_at: Option<DateTime<Utc>>,
    pub vote_summary: VoteSummary,
    pub user_vote: i16,
}

impl Comment {
    pub fn new(
        id: Snowflake,
        post_id: Snowflake,
        user_id: Snowflake,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            post_id,
            parent_id: None,
            user_id,
            author: None,
            content,
            created_at,
            is_pinned: false,
            pinned_by: None,
            pinned_at: None,
            vote_summary: VoteSummary::default(),
            user_vote: 0,
        }
    }

    #[inline]
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

impl FeedEntity for Comment {
    fn id(&self) -> Snowflake {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    fn pinned_at(&self) -> Option<DateTime<Utc>> {
        self.pinned_at
    }

    fn vote_summary(&self) -> VoteSummary {
        self.vote_summary
    }

    fn user_vote(&self) -> i16 {
        self.user_vote
    }

    fn set_vote(&mut self, summary: VoteSummary, user_vote: i16) {
        self.vote_summary = summary;
        self.user_vote = user_vote;
    }

    fn set_pin(&mut self, pin: &PinState) {
        self.is_pinned = pin.is_pinned;
        self.pinned_by = pin.pinned_by;
        self.pinned_at = pin.pinned_at;
    }

    // Comments have no favorites; the flag is ignored
    fn decorate(&mut self, decoration: &Decoration) {
        self.vote_summary = decoration.vote_summary;
        self.user_vote = decoration.user_vote;
    }
}

/// Values for a comment insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub parent_id: Option<Snowflake>,
    pub user_id: Snowflake,
    pub content: String,
}
