//! Reaction tally cache
//!
//! Emoji multisets per (entity type, entity id). After a toggle the entry is
//! re-read from the store by default; with `ConsistencyModel::WriteThrough`
//! the cached tally is patched in place instead.

use std::collections::HashMap;

use dashmap::{DashMap, DashSet};
use tracing::{debug, info, instrument, warn};

use feed_common::ConsistencyModel;
use feed_core::{EntityType, Reaction, ReactionTally, Snowflake, Viewer, AVAILABLE_EMOJIS};

use super::context::SyncContext;
use super::error::{ServiceError, ServiceResult};
use super::outcome::Outcome;
use super::permission::{require_id, require_viewer};

type TallyKey = (EntityType, Snowflake);

pub struct ReactionTallyCache {
    ctx: SyncContext,
    consistency: ConsistencyModel,
    tallies: DashMap<TallyKey, ReactionTally>,
    loading: DashSet<TallyKey>,
}

impl ReactionTallyCache {
    pub fn new(ctx: SyncContext) -> Self {
        let consistency = ctx.feed_config().reaction_consistency;
        Self {
            ctx,
            consistency,
            tallies: DashMap::new(),
            loading: DashSet::new(),
        }
    }

    pub fn consistency(&self) -> ConsistencyModel {
        self.consistency
    }

    /// Re-read every reaction row of one entity and replace its tally
    #[instrument(skip(self, viewer))]
    pub async fn fetch_reactions(
        &self,
        viewer: Option<Viewer>,
        entity_id: Snowflake,
        entity_type: EntityType,
    ) -> Outcome<ReactionTally> {
        self.try_fetch_reactions(viewer, entity_id, entity_type)
            .await
            .into()
    }

    async fn try_fetch_reactions(
        &self,
        viewer: Option<Viewer>,
        entity_id: Snowflake,
        entity_type: EntityType,
    ) -> ServiceResult<ReactionTally> {
        require_id(entity_id, "entity")?;

        let key = (entity_type, entity_id);
        self.loading.insert(key);
        let result = self
            .ctx
            .reaction_repo()
            .find_by_entity(entity_type, entity_id)
            .await;
        self.loading.remove(&key);

        let rows = result?;
        let tally = ReactionTally::from_rows(&rows, viewer.map(|v| v.id));
        self.tallies.insert(key, tally.clone());

        debug!(entity_id = %entity_id, entity_type = %entity_type, total = tally.total, "Reactions loaded");
        Ok(tally)
    }

    /// Tallies for many entities of one type in a single lookup
    ///
    /// A failed lookup is logged and yields empty tallies without touching
    /// what is already cached.
    #[instrument(skip(self, viewer, entity_ids), fields(count = entity_ids.len()))]
    pub async fn fetch_reactions_batch(
        &self,
        viewer: Option<Viewer>,
        entity_ids: &[Snowflake],
        entity_type: EntityType,
    ) -> HashMap<Snowflake, ReactionTally> {
        if entity_ids.is_empty() {
            return HashMap::new();
        }

        let rows = match self
            .ctx
            .reaction_repo()
            .find_by_entities(entity_type, entity_ids)
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Reaction lookup failed, using empty tallies");
                return entity_ids
                    .iter()
                    .map(|id| (*id, ReactionTally::default()))
                    .collect();
            }
        };

        let mut grouped: HashMap<Snowflake, Vec<&Reaction>> =
            entity_ids.iter().map(|id| (*id, Vec::new())).collect();
        for reaction in &rows {
            if let Some(group) = grouped.get_mut(&reaction.entity_id) {
                group.push(reaction);
            }
        }

        let viewer_id = viewer.map(|v| v.id);
        grouped
            .into_iter()
            .map(|(id, group)| {
                let tally = ReactionTally::from_rows(group, viewer_id);
                self.tallies.insert((entity_type, id), tally.clone());
                (id, tally)
            })
            .collect()
    }

    /// Remove the viewer's `emoji` if held, add it otherwise
    #[instrument(skip(self, viewer))]
    pub async fn toggle_reaction(
        &self,
        viewer: Option<Viewer>,
        entity_id: Snowflake,
        emoji: &str,
        entity_type: EntityType,
    ) -> Outcome<ReactionTally> {
        self.try_toggle_reaction(viewer, entity_id, emoji, entity_type)
            .await
            .into()
    }

    async fn try_toggle_reaction(
        &self,
        viewer: Option<Viewer>,
        entity_id: Snowflake,
        emoji: &str,
        entity_type: EntityType,
    ) -> ServiceResult<ReactionTally> {
        let current = require_viewer(viewer)?;
        require_id(entity_id, "entity")?;
        if emoji.trim().is_empty() {
            return Err(ServiceError::validation("Emoji must not be empty"));
        }

        let key = (entity_type, entity_id);
        let held = self
            .tallies
            .get(&key)
            .is_some_and(|tally| tally.has_reacted(emoji));

        let reactions = self.ctx.reaction_repo();
        if held {
            reactions
                .delete(entity_type, entity_id, current.id, emoji)
                .await?;
        } else {
            let reaction = Reaction::new(
                self.ctx.generate_id(),
                entity_id,
                entity_type,
                current.id,
                emoji.to_string(),
            );
            reactions.create(&reaction).await?;
        }

        info!(entity_id = %entity_id, entity_type = %entity_type, user_id = %current.id, emoji, added = !held, "Reaction toggled");

        match self.consistency {
            ConsistencyModel::Refetch => {
                self.try_fetch_reactions(viewer, entity_id, entity_type)
                    .await
            }
            ConsistencyModel::WriteThrough => {
                let mut tally = self.tallies.entry(key).or_default();
                if held {
                    tally.remove_own(emoji);
                } else {
                    tally.add_own(emoji);
                }
                Ok(tally.clone())
            }
        }
    }

    // === Accessors ===

    /// Cached tally, or an empty one when the entity was never fetched
    pub fn reaction_data(&self, entity_id: Snowflake, entity_type: EntityType) -> ReactionTally {
        self.tallies
            .get(&(entity_type, entity_id))
            .map(|tally| tally.clone())
            .unwrap_or_default()
    }

    pub fn is_loading(&self, entity_id: Snowflake, entity_type: EntityType) -> bool {
        self.loading.contains(&(entity_type, entity_id))
    }

    pub fn available_emojis(&self) -> &'static [&'static str] {
        &AVAILABLE_EMOJIS
    }
}
