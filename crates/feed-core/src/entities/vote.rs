//! Vote rows and the aggregate they fold into

use serde::Serialize;

use crate::value_objects::{Snowflake, VoteValue};

/// One user's vote on one post or comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vote {
    pub entity_id: Snowflake,
    pub user_id: Snowflake,
    pub value: VoteValue,
}

impl Vote {
    pub fn new(entity_id: Snowflake, user_id: Snowflake, value: VoteValue) -> Self {
        Self {
            entity_id,
            user_id,
            value,
        }
    }
}

/// Up/down tally with its derived score
///
/// Fields are only ever changed through [`VoteSummary::new`] or the aggregate
/// policy, both of which keep `score == upvotes - downvotes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VoteSummary {
    pub upvotes: u32,
    pub downvotes: u32,
    pub score: i64,
}

impl VoteSummary {
    pub fn new(upvotes: u32, downvotes: u32) -> Self {
        Self {
            upvotes,
            downvotes,
            score: i64::from(upvotes) - i64::from(downvotes),
        }
    }

    /// Count one stored vote row
    pub fn record(&mut self, value: VoteValue) {
        *self = match value {
            VoteValue::Up => Self::new(self.upvotes.saturating_add(1), self.downvotes),
            VoteValue::Down => Self::new(self.upvotes, self.downvotes.saturating_add(1)),
        };
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.score == i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}
