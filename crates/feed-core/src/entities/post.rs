//! Post entity - a top-level feed entry

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::decoration::Decoration;
use super::vote::VoteSummary;
use super::{Author, FeedEntity, PinState};
use crate::value_objects::Snowflake;

/// Post as held by the feed cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub author: Option<Author>,
    pub content: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_pinned: bool,
    pub pinned_by: Option<Snowflake>,
    pub pinned_at: Option<DateTime<Utc>>,
    pub vote_summary: VoteSummary,
    pub user_vote: i16,
    pub is_favorited: bool,
    /// Only set on entries of the favorites view
    pub favorited_at: Option<DateTime<Utc>>,
}

impl Post {
    /// A freshly stored row, before any decoration
    pub fn new(id: Snowflake, user_id: Snowflake, content: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            author: None,
            content,
            image_url: None,
            created_at,
            is_pinned: false,
            pinned_by: None,
            pinned_at: None,
            vote_summary: VoteSummary::default(),
            user_vote: 0,
            is_favorited: false,
            favorited_at: None,
        }
    }

    #[inline]
    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }
}

impl FeedEntity for Post {
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

    fn decorate(&mut self, decoration: &Decoration) {
        self.vote_summary = decoration.vote_summary;
        self.user_vote = decoration.user_vote;
        self.is_favorited = decoration.is_favorited;
    }
}

/// Values for a post insert; the id is named by this layer, timestamps by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub id: Snowflake,
    pub user_id: Snowflake,
    pub content: String,
    pub image_url: Option<String>,
}
