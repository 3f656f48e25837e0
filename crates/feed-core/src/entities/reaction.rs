//! Reaction entity - an emoji a user attached to a post or comment

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::value_objects::{EntityType, Snowflake};

/// Emoji offered to the UI. Not enforced here; the store may accept others.
pub const AVAILABLE_EMOJIS: [&str; 10] = [
    "👍", "❤️", "😂", "😮", "😢", "😡", "👏", "🤔", "🔥", "💯",
];

/// Reaction row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    pub id: Snowflake,
    pub entity_id: Snowflake,
    pub entity_type: EntityType,
    pub user_id: Snowflake,
    pub emoji: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn new(
        id: Snowflake,
        entity_id: Snowflake,
        entity_type: EntityType,
        user_id: Snowflake,
        emoji: String,
    ) -> Self {
        Self {
            id,
            entity_id,
            entity_type,
            user_id,
            emoji,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_emoji(&self, emoji: &str) -> bool {
        self.emoji == emoji
    }
}

/// Per-entity reaction multiset as shown to one viewer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReactionTally {
    pub counts: BTreeMap<String, u32>,
    pub user_reactions: BTreeSet<String>,
    pub total: u32,
}

impl ReactionTally {
    /// Fold every reaction row of one entity
    pub fn from_rows<'a, I>(rows: I, viewer_id: Option<Snowflake>) -> Self
    where
        I: IntoIterator<Item = &'a Reaction>,
    {
        let mut tally = Self::default();
        for reaction in rows {
            *tally.counts.entry(reaction.emoji.clone()).or_insert(0) += 1;
            tally.total += 1;
            if Some(reaction.user_id) == viewer_id {
                tally.user_reactions.insert(reaction.emoji.clone());
            }
        }
        tally
    }

    pub fn count(&self, emoji: &str) -> u32 {
        self.counts.get(emoji).copied().unwrap_or(0)
    }

    #[inline]
    pub fn has_reacted(&self, emoji: &str) -> bool {
        self.user_reactions.contains(emoji)
    }

    /// Local patch for a reaction the viewer just added
    pub fn add_own(&mut self, emoji: &str) {
        if self.user_reactions.insert(emoji.to_string()) {
            *self.counts.entry(emoji.to_string()).or_insert(0) += 1;
            self.total += 1;
        }
    }

    /// Local patch for a reaction the viewer just removed; counts floor at zero
    pub fn remove_own(&mut self, emoji: &str) {
        if !self.user_reactions.remove(emoji) {
            return;
        }
        if let Some(count) = self.counts.get_mut(emoji) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.counts.remove(emoji);
            }
        }
        self.total = self.total.saturating_sub(1);
    }
}
