//! Enrichment pipeline - batched decoration of fetched posts and comments
//!
//! One vote lookup and at most one favorites lookup per call, whatever the
//! batch size. Lookups fail open: a failing collaborator leaves its fields at
//! their defaults for the whole batch.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::{self, Either};
use tracing::{instrument, warn};

use feed_core::entities::{Decoration, FeedEntity};
use feed_core::traits::{FavoriteRepository, RepoResult, VoteRepository};
use feed_core::{EntityType, Snowflake, VoteSummary};

/// Whose viewer-relative fields (`user_vote`, `is_favorited`) a cached list holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ViewerScope {
    /// Nothing viewer-relative cached yet
    #[default]
    Empty,
    Viewer(Option<Snowflake>),
    /// Decorated for more than one viewer; no viewer-relative field can be trusted
    Mixed,
}

impl ViewerScope {
    pub(crate) fn record(&mut self, viewer_id: Option<Snowflake>) {
        *self = match *self {
            Self::Empty => Self::Viewer(viewer_id),
            Self::Viewer(current) if current == viewer_id => Self::Viewer(current),
            _ => Self::Mixed,
        };
    }

    /// Cached viewer-relative fields may be read and patched on behalf of `viewer_id`
    pub(crate) fn admits(self, viewer_id: Option<Snowflake>) -> bool {
        match self {
            Self::Empty => true,
            Self::Viewer(current) => current == viewer_id,
            Self::Mixed => false,
        }
    }
}

pub struct EnrichmentPipeline {
    votes: Arc<dyn VoteRepository>,
    favorites: Option<Arc<dyn FavoriteRepository>>,
    entity_type: EntityType,
}

impl EnrichmentPipeline {
    /// Votes and favorites, for posts
    pub fn for_posts(
        votes: Arc<dyn VoteRepository>,
        favorites: Arc<dyn FavoriteRepository>,
    ) -> Self {
        Self {
            votes,
            favorites: Some(favorites),
            entity_type: EntityType::Post,
        }
    }

    /// Votes only, for comments
    pub fn for_comments(votes: Arc<dyn VoteRepository>) -> Self {
        Self {
            votes,
            favorites: None,
            entity_type: EntityType::Comment,
        }
    }

    /// Decoration for every id in `ids`; ids without rows get defaults
    #[instrument(skip(self, ids), fields(entity_type = %self.entity_type, count = ids.len()))]
    pub async fn decorate(
        &self,
        ids: &[Snowflake],
        viewer_id: Option<Snowflake>,
    ) -> HashMap<Snowflake, Decoration> {
        if ids.is_empty() {
            return HashMap::new();
        }

        let votes_lookup = self.votes.find_by_entities(self.entity_type, ids);
        let favorites_lookup = match (&self.favorites, viewer_id) {
            (Some(favorites), Some(viewer)) => {
                Either::Left(async move { Some(favorites.find_for_posts(viewer, ids).await) })
            }
            _ => Either::Right(future::ready(None)),
        };

        let (votes, favorites) = future::join(votes_lookup, favorites_lookup).await;

        let mut decorations: HashMap<Snowflake, Decoration> = ids
            .iter()
            .map(|id| (*id, Decoration::default()))
            .collect();

        match votes {
            Ok(rows) => {
                for vote in rows {
                    if let Some(decoration) = decorations.get_mut(&vote.entity_id) {
                        decoration.vote_summary.record(vote.value);
                        if Some(vote.user_id) == viewer_id {
                            decoration.user_vote = vote.value.as_i16();
                        }
                    }
                }
            }
            Err(e) => warn!(error = %e, "Vote lookup failed, using neutral tallies"),
        }

        match favorites {
            Some(Ok(rows)) => {
                let favorited: HashSet<Snowflake> = rows.iter().map(|f| f.post_id).collect();
                for (id, decoration) in &mut decorations {
                    decoration.is_favorited = favorited.contains(id);
                }
            }
            Some(Err(e)) => warn!(error = %e, "Favorite lookup failed, marking none favorited"),
            None => {}
        }

        decorations
    }

    /// Stored tally and the viewer's own vote for one entity
    ///
    /// Does not fail open: callers write based on the result.
    #[instrument(skip(self), fields(entity_type = %self.entity_type))]
    pub async fn current_vote(
        &self,
        entity_id: Snowflake,
        viewer_id: Snowflake,
    ) -> RepoResult<(i16, VoteSummary)> {
        let rows = self
            .votes
            .find_by_entities(self.entity_type, &[entity_id])
            .await?;

        let mut summary = VoteSummary::default();
        let mut user_vote = 0;
        for vote in rows.iter().filter(|v| v.entity_id == entity_id) {
            summary.record(vote.value);
            if vote.user_id == viewer_id {
                user_vote = vote.value.as_i16();
            }
        }
        Ok((user_vote, summary))
    }

    /// Decorate entities in place
    pub async fn apply<T: FeedEntity>(&self, entities: &mut [T], viewer_id: Option<Snowflake>) {
        let ids: Vec<Snowflake> = entities.iter().map(FeedEntity::id).collect();
        let decorations = self.decorate(&ids, viewer_id).await;

        for entity in entities.iter_mut() {
            if let Some(decoration) = decorations.get(&entity.id()) {
                entity.decorate(decoration);
            }
        }
    }
}
