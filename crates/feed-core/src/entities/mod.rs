//! Domain entities - rows of the remote store as held by the caches

mod comment;
mod decoration;
mod favorite;
mod post;
mod reaction;
mod viewer;
mod vote;

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

pub use comment::{Comment, NewComment};
pub use decoration::Decoration;
pub use favorite::Favorite;
pub use post::{NewPost, Post};
pub use reaction::{Reaction, ReactionTally, AVAILABLE_EMOJIS};
pub use viewer::{Author, Profile, Viewer};
pub use vote::{Vote, VoteSummary};

/// Pin columns shared by posts and comments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinState {
    pub is_pinned: bool,
    pub pinned_by: Option<Snowflake>,
    pub pinned_at: Option<DateTime<Utc>>,
}

impl PinState {
    pub fn pinned(by: Snowflake, at: DateTime<Utc>) -> Self {
        Self {
            is_pinned: true,
            pinned_by: Some(by),
            pinned_at: Some(at),
        }
    }

    pub fn unpinned() -> Self {
        Self {
            is_pinned: false,
            pinned_by: None,
            pinned_at: None,
        }
    }
}

/// Common surface of posts and comments used by ordering and vote/pin patches
pub trait FeedEntity {
    fn id(&self) -> Snowflake;
    fn created_at(&self) -> DateTime<Utc>;
    fn is_pinned(&self) -> bool;
    fn pinned_at(&self) -> Option<DateTime<Utc>>;
    fn vote_summary(&self) -> VoteSummary;
    /// -1, 0 or 1
    fn user_vote(&self) -> i16;
    fn set_vote(&mut self, summary: VoteSummary, user_vote: i16);
    fn set_pin(&mut self, pin: &PinState);
    fn decorate(&mut self, decoration: &Decoration);
}
