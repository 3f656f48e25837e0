//! Viewer-relative and aggregate fields attached to fetched rows

use serde::Serialize;

use super::vote::VoteSummary;

/// Derived fields computed for one entity by a batched enrichment pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Decoration {
    pub vote_summary: VoteSummary,
    /// The viewer's own vote: -1, 0 or 1
    pub user_vote: i16,
    pub is_favorited: bool,
}
