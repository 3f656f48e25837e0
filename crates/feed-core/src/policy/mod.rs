//! Aggregate policy - vote deltas and entry ordering
//!
//! Pure functions shared by the feed and comment caches. Posts are listed
//! newest first and comments oldest first; both put pinned entries on top.

use std::cmp::Ordering;

use crate::entities::{FeedEntity, VoteSummary};

/// Direction of the creation-time key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Oldest first (comment threads)
    Ascending,
    /// Newest first (the post feed)
    Descending,
}

impl SortDirection {
    #[inline]
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

/// Move one vote from `old_vote` to `new_vote` (each -1, 0 or 1)
///
/// Clearing a vote is `new_vote = 0`. Counters never drop below zero.
pub fn apply_vote_delta(summary: VoteSummary, old_vote: i16, new_vote: i16) -> VoteSummary {
    let mut upvotes = summary.upvotes;
    let mut downvotes = summary.downvotes;

    match old_vote {
        1 => upvotes = upvotes.saturating_sub(1),
        -1 => downvotes = downvotes.saturating_sub(1),
        _ => {}
    }

    match new_vote {
        1 => upvotes = upvotes.saturating_add(1),
        -1 => downvotes = downvotes.saturating_add(1),
        _ => {}
    }

    VoteSummary::new(upvotes, downvotes)
}

/// Pinned entries first; among pinned, the most recently pinned first
///
/// Returns `Equal` for two unpinned entries (and for pinned ties) so the
/// caller can chain a secondary key.
pub fn compare_pinned<T: FeedEntity>(a: &T, b: &T) -> Ordering {
    match (a.is_pinned(), b.is_pinned()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
        // Later pinned_at first, missing pinned_at last
        (true, true) => match (a.pinned_at(), b.pinned_at()) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

pub fn compare_recency<T: FeedEntity>(a: &T, b: &T, direction: SortDirection) -> Ordering {
    direction.apply(a.created_at().cmp(&b.created_at()))
}

/// Full ordering: pin, then creation time, then id in the same direction
pub fn compare_entries<T: FeedEntity>(a: &T, b: &T, direction: SortDirection) -> Ordering {
    compare_pinned(a, b)
        .then_with(|| compare_recency(a, b, direction))
        .then_with(|| direction.apply(a.id().cmp(&b.id())))
}

pub fn sort_entries<T: FeedEntity>(entries: &mut [T], direction: SortDirection) {
    entries.sort_by(|a, b| compare_entries(a, b, direction));
}

/// Check a list against [`compare_entries`]
pub fn is_sorted<T: FeedEntity>(entries: &[T], direction: SortDirection) -> bool {
    entries
        .windows(2)
        .all(|pair| compare_entries(&pair[0], &pair[1], direction) != Ordering::Greater)
}
