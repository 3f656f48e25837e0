//! Paginated feed cache
//!
//! Holds the post list in page-cursor order plus the viewer's favorites view.
//! Votes, favorites and pins are written through: the remote write happens
//! first and the cached copies are patched only once it succeeded.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use feed_core::entities::{Favorite, FeedEntity, NewPost, PinState, Post};
use feed_core::policy::{apply_vote_delta, sort_entries, SortDirection};
use feed_core::traits::PageRange;
use feed_core::{EntityType, Snowflake, Viewer, Vote, VoteValue};

use crate::dto::CreatePostRequest;

use super::context::SyncContext;
use super::enrichment::{EnrichmentPipeline, ViewerScope};
use super::error::{ServiceError, ServiceResult};
use super::outcome::Outcome;
use super::permission::{require_admin, require_id, require_viewer};

struct FeedState {
    posts: Vec<Post>,
    favorites: Vec<Post>,
    loading: bool,
    loading_more: bool,
    has_more: bool,
    page: u32,
    /// Bumped by every reset; page results from an older generation are dropped
    generation: u64,
    /// Viewer both lists were decorated for
    scope: ViewerScope,
}

impl FeedState {
    fn new(generation: u64) -> Self {
        Self {
            posts: Vec::new(),
            favorites: Vec::new(),
            loading: false,
            loading_more: false,
            has_more: true,
            page: 0,
            generation,
            scope: ViewerScope::Empty,
        }
    }

    /// Favorite membership as cached for `viewer_id`, if the cache knows it
    fn cached_favorite(&self, post_id: Snowflake, viewer_id: Snowflake) -> Option<bool> {
        if !self.scope.admits(Some(viewer_id)) {
            return None;
        }
        if self.favorites.iter().any(|p| p.id == post_id) {
            return Some(true);
        }
        self.posts
            .iter()
            .find(|p| p.id == post_id)
            .map(|p| p.is_favorited)
    }

    /// Every cached copy of a post, main list first
    fn copies_mut(&mut self, post_id: Snowflake) -> impl Iterator<Item = &mut Post> {
        self.posts
            .iter_mut()
            .chain(self.favorites.iter_mut())
            .filter(move |p| p.id == post_id)
    }

    fn find(&self, post_id: Snowflake) -> Option<&Post> {
        self.posts
            .iter()
            .chain(self.favorites.iter())
            .find(|p| p.id == post_id)
    }
}

/// Feed cache
pub struct FeedCache {
    ctx: SyncContext,
    enrichment: EnrichmentPipeline,
    page_size: u32,
    state: Mutex<FeedState>,
}

impl FeedCache {
    pub fn new(ctx: SyncContext) -> Self {
        let enrichment = EnrichmentPipeline::for_posts(ctx.vote_repo(), ctx.favorite_repo());
        let page_size = ctx.feed_config().page_size;
        Self {
            ctx,
            enrichment,
            page_size,
            state: Mutex::new(FeedState::new(0)),
        }
    }

    // === Pagination ===

    /// Fetch the first page (`reset`) or the next one
    ///
    /// Returns the posts this call added. A non-reset call while a fetch is in
    /// flight, or after the last page, succeeds with no posts.
    #[instrument(skip(self, viewer), fields(viewer_id = ?viewer.map(|v| v.id)))]
    pub async fn fetch_posts(&self, viewer: Option<Viewer>, reset: bool) -> Outcome<Vec<Post>> {
        self.try_fetch_posts(viewer, reset).await.into()
    }

    pub async fn fetch_more(&self, viewer: Option<Viewer>) -> Outcome<Vec<Post>> {
        self.fetch_posts(viewer, false).await
    }

    async fn try_fetch_posts(&self, viewer: Option<Viewer>, reset: bool) -> ServiceResult<Vec<Post>> {
        let (range, generation) = {
            let mut state = self.state.lock();
            if reset {
                let generation = state.generation + 1;
                let viewer_id = viewer.map(|v| v.id);
                // The favorites view survives a reset only for the viewer it was built for
                let keep_favorites = matches!(state.scope, ViewerScope::Viewer(owner) if owner == viewer_id);
                let favorites = std::mem::take(&mut state.favorites);
                *state = FeedState::new(generation);
                if keep_favorites {
                    state.favorites = favorites;
                    state.scope.record(viewer_id);
                }
                state.loading = true;
            } else {
                if state.loading || state.loading_more || !state.has_more {
                    debug!(
                        loading = state.loading,
                        loading_more = state.loading_more,
                        has_more = state.has_more,
                        "Skipping page fetch"
                    );
                    return Ok(Vec::new());
                }
                state.loading_more = true;
            }
            (PageRange::for_page(state.page, self.page_size), state.generation)
        };

        let fetched = self.load_page(range, viewer).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding page from a superseded fetch");
            return Ok(Vec::new());
        }
        if reset {
            state.loading = false;
        } else {
            state.loading_more = false;
        }

        let mut fetched = fetched?;
        let returned = fetched.len();

        if returned < self.page_size as usize {
            state.has_more = false;
        }
        if returned > 0 {
            state.page += 1;
            state.scope.record(viewer.map(|v| v.id));
        }

        let mut held: HashSet<Snowflake> = state.posts.iter().map(|p| p.id).collect();
        fetched.retain(|p| held.insert(p.id));

        state.posts.extend(fetched.iter().cloned());
        sort_entries(&mut state.posts, SortDirection::Descending);

        info!(
            page = state.page,
            returned,
            added = fetched.len(),
            has_more = state.has_more,
            "Feed page loaded"
        );

        Ok(fetched)
    }

    async fn load_page(&self, range: PageRange, viewer: Option<Viewer>) -> ServiceResult<Vec<Post>> {
        let mut posts = self.ctx.post_repo().find_page(range).await?;
        self.enrichment.apply(&mut posts, viewer.map(|v| v.id)).await;
        Ok(posts)
    }

    // === Mutations ===

    #[instrument(skip(self, viewer, request))]
    pub async fn create_post(&self, viewer: Option<Viewer>, request: CreatePostRequest) -> Outcome<Post> {
        self.try_create_post(viewer, request).await.into()
    }

    async fn try_create_post(&self, viewer: Option<Viewer>, request: CreatePostRequest) -> ServiceResult<Post> {
        let viewer = require_viewer(viewer)?;
        request.validate()?;

        let new_post = NewPost {
            id: self.ctx.generate_id(),
            user_id: viewer.id,
            content: request.content.trim().to_string(),
            image_url: request.image_url,
        };

        let mut post = self.ctx.post_repo().create(&new_post).await?;
        self.enrichment
            .apply(std::slice::from_mut(&mut post), Some(viewer.id))
            .await;

        {
            let mut state = self.state.lock();
            state.posts.retain(|p| p.id != post.id);
            state.posts.insert(0, post.clone());
            state.has_more = true;
            sort_entries(&mut state.posts, SortDirection::Descending);
        }

        info!(post_id = %post.id, user_id = %viewer.id, "Post created");
        Ok(post)
    }

    /// Remote delete, then drop the post from both lists
    #[instrument(skip(self, viewer))]
    pub async fn delete_post(&self, viewer: Option<Viewer>, post_id: Snowflake) -> Outcome<()> {
        self.try_delete_post(viewer, post_id).await.into()
    }

    async fn try_delete_post(&self, viewer: Option<Viewer>, post_id: Snowflake) -> ServiceResult<()> {
        let viewer = require_viewer(viewer)?;
        require_id(post_id, "post")?;

        self.ctx.post_repo().delete(post_id).await?;

        {
            let mut state = self.state.lock();
            state.posts.retain(|p| p.id != post_id);
            state.favorites.retain(|p| p.id != post_id);
        }

        info!(post_id = %post_id, user_id = %viewer.id, "Post deleted");
        Ok(())
    }

    /// Vote `value`, or clear the vote when the viewer already voted `value`
    ///
    /// Returns the viewer's resulting vote (-1, 0 or 1).
    #[instrument(skip(self, viewer))]
    pub async fn toggle_post_vote(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        value: VoteValue,
    ) -> Outcome<i16> {
        self.try_toggle_post_vote(viewer, post_id, value).await.into()
    }

    async fn try_toggle_post_vote(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        value: VoteValue,
    ) -> ServiceResult<i16> {
        let viewer = require_viewer(viewer)?;
        require_id(post_id, "post")?;

        // Snapshot before the write; concurrent toggles on one post are not
        // serialized and the last patch to land wins.
        let (cached, own_scope) = {
            let state = self.state.lock();
            let post = state
                .find(post_id)
                .ok_or_else(|| ServiceError::not_found("Post", post_id.to_string()))?;
            (
                (post.user_vote, post.vote_summary),
                state.scope.admits(Some(viewer.id)),
            )
        };
        let (old_vote, summary) = if own_scope {
            cached
        } else {
            debug!(post_id = %post_id, user_id = %viewer.id, "Cached vote belongs to another viewer, reading the store");
            self.enrichment.current_vote(post_id, viewer.id).await?
        };

        let new_vote = if old_vote == value.as_i16() { 0 } else { value.as_i16() };
        let votes = self.ctx.vote_repo();
        if new_vote == 0 {
            votes.delete(EntityType::Post, post_id, viewer.id).await?;
        } else {
            votes
                .upsert(EntityType::Post, &Vote::new(post_id, viewer.id, value))
                .await?;
        }

        let patched = apply_vote_delta(summary, old_vote, new_vote);
        {
            let mut state = self.state.lock();
            // The tally is shared by every viewer; `user_vote` only by the one the list was decorated for
            let own_scope = state.scope.admits(Some(viewer.id));
            if own_scope {
                state.scope.record(Some(viewer.id));
            }
            for post in state.copies_mut(post_id) {
                if own_scope {
                    post.set_vote(patched, new_vote);
                } else {
                    post.vote_summary = patched;
                }
            }
        }

        info!(post_id = %post_id, user_id = %viewer.id, old_vote, new_vote, "Post vote toggled");
        Ok(new_vote)
    }

    /// Make the viewer's favorite membership equal `desired`
    ///
    /// Succeeds without a remote call only when the post is cached for this
    /// viewer and already in the desired state; otherwise the idempotent
    /// insert or delete is always issued.
    #[instrument(skip(self, viewer))]
    pub async fn set_favorite(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        desired: bool,
    ) -> Outcome<bool> {
        self.try_set_favorite(viewer, post_id, desired).await.into()
    }

    /// Flip the viewer's favorite membership; returns the new state
    #[instrument(skip(self, viewer))]
    pub async fn toggle_favorite(&self, viewer: Option<Viewer>, post_id: Snowflake) -> Outcome<bool> {
        self.try_toggle_favorite(viewer, post_id).await.into()
    }

    async fn try_toggle_favorite(&self, viewer: Option<Viewer>, post_id: Snowflake) -> ServiceResult<bool> {
        let current_viewer = require_viewer(viewer)?;
        require_id(post_id, "post")?;

        let cached = self.state.lock().cached_favorite(post_id, current_viewer.id);
        let current = match cached {
            Some(current) => current,
            None => !self
                .ctx
                .favorite_repo()
                .find_for_posts(current_viewer.id, &[post_id])
                .await?
                .is_empty(),
        };

        self.try_set_favorite(viewer, post_id, !current).await
    }

    async fn try_set_favorite(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        desired: bool,
    ) -> ServiceResult<bool> {
        let viewer = require_viewer(viewer)?;
        require_id(post_id, "post")?;

        let (cached, own_scope) = {
            let state = self.state.lock();
            (
                state.cached_favorite(post_id, viewer.id),
                state.scope.admits(Some(viewer.id)),
            )
        };
        if cached == Some(desired) {
            debug!(post_id = %post_id, desired, "Favorite already in desired state");
            return Ok(desired);
        }

        let favorites = self.ctx.favorite_repo();
        if desired {
            let stored = favorites.create(&Favorite::new(post_id, viewer.id)).await?;

            // Another viewer's lists are left alone; only the store changes
            let entry = if own_scope {
                self.favorite_entry(post_id, viewer.id, stored.created_at).await?
            } else {
                None
            };

            let mut state = self.state.lock();
            if state.scope.admits(Some(viewer.id)) {
                state.scope.record(Some(viewer.id));
                for post in state.posts.iter_mut().filter(|p| p.id == post_id) {
                    post.is_favorited = true;
                }
                if let Some(entry) = entry {
                    state.favorites.retain(|p| p.id != post_id);
                    state.favorites.push(entry);
                    state
                        .favorites
                        .sort_by(|a, b| b.favorited_at.cmp(&a.favorited_at));
                }
            }
        } else {
            favorites.delete(post_id, viewer.id).await?;

            let mut state = self.state.lock();
            if state.scope.admits(Some(viewer.id)) {
                for post in state.posts.iter_mut().filter(|p| p.id == post_id) {
                    post.is_favorited = false;
                }
                state.favorites.retain(|p| p.id != post_id);
            }
        }

        info!(post_id = %post_id, user_id = %viewer.id, favorited = desired, "Favorite updated");
        Ok(desired)
    }

    /// The post as it appears in the favorites view, stamped with the stored favorite time
    async fn favorite_entry(
        &self,
        post_id: Snowflake,
        viewer_id: Snowflake,
        favorited_at: DateTime<Utc>,
    ) -> ServiceResult<Option<Post>> {
        let Some(mut post) = self.ctx.post_repo().find_by_id(post_id).await? else {
            warn!(post_id = %post_id, "Favorited post is gone from the store");
            return Ok(None);
        };
        self.enrichment
            .apply(std::slice::from_mut(&mut post), Some(viewer_id))
            .await;
        post.is_favorited = true;
        post.favorited_at = Some(favorited_at);
        Ok(Some(post))
    }

    /// Pin or unpin a post (admins only), then resort
    #[instrument(skip(self, viewer))]
    pub async fn toggle_post_pin(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        should_pin: bool,
    ) -> Outcome<Post> {
        self.try_toggle_post_pin(viewer, post_id, should_pin).await.into()
    }

    async fn try_toggle_post_pin(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        should_pin: bool,
    ) -> ServiceResult<Post> {
        let viewer = require_admin(viewer)?;
        require_id(post_id, "post")?;

        let pin = if should_pin {
            PinState::pinned(viewer.id, Utc::now())
        } else {
            PinState::unpinned()
        };

        let updated = self.ctx.post_repo().update_pin(post_id, &pin).await?;
        let stored = PinState {
            is_pinned: updated.is_pinned,
            pinned_by: updated.pinned_by,
            pinned_at: updated.pinned_at,
        };

        let cached = {
            let mut state = self.state.lock();
            for post in state.copies_mut(post_id) {
                post.set_pin(&stored);
            }
            sort_entries(&mut state.posts, SortDirection::Descending);
            if state.scope.admits(Some(viewer.id)) {
                state.find(post_id).cloned()
            } else {
                None
            }
        };

        info!(post_id = %post_id, admin_id = %viewer.id, pinned = stored.is_pinned, "Post pin updated");
        if let Some(post) = cached {
            return Ok(post);
        }

        // Not cached for this admin: decorate the stored row for them
        let mut post = updated;
        self.enrichment
            .apply(std::slice::from_mut(&mut post), Some(viewer.id))
            .await;
        Ok(post)
    }

    /// Replace the favorites view with the viewer's favorites, newest first
    #[instrument(skip(self, viewer))]
    pub async fn fetch_favorite_posts(&self, viewer: Option<Viewer>) -> Outcome<Vec<Post>> {
        self.try_fetch_favorite_posts(viewer).await.into()
    }

    async fn try_fetch_favorite_posts(&self, viewer: Option<Viewer>) -> ServiceResult<Vec<Post>> {
        let viewer = require_viewer(viewer)?;

        let favorites = self.ctx.favorite_repo().find_by_user(viewer.id).await?;
        let ids: Vec<Snowflake> = favorites.iter().map(|f| f.post_id).collect();

        let mut posts = self.ctx.post_repo().find_by_ids(&ids).await?;
        self.enrichment.apply(&mut posts, Some(viewer.id)).await;

        let mut by_id: HashMap<Snowflake, Post> = posts.into_iter().map(|p| (p.id, p)).collect();
        let view: Vec<Post> = favorites
            .iter()
            .filter_map(|favorite| {
                by_id.remove(&favorite.post_id).map(|mut post| {
                    post.is_favorited = true;
                    post.favorited_at = Some(favorite.created_at);
                    post
                })
            })
            .collect();

        {
            let mut state = self.state.lock();
            if state.scope.admits(Some(viewer.id)) {
                let members: HashSet<Snowflake> = view.iter().map(|p| p.id).collect();
                for post in &mut state.posts {
                    post.is_favorited = members.contains(&post.id);
                }
            } else {
                // The loaded pages belong to another viewer; rebuild them on the next reset
                state.scope = ViewerScope::Mixed;
            }
            state.scope.record(Some(viewer.id));
            state.favorites.clone_from(&view);
        }

        info!(user_id = %viewer.id, count = view.len(), "Favorite posts loaded");
        Ok(view)
    }

    // === Accessors ===

    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().posts.clone()
    }

    pub fn favorite_posts(&self) -> Vec<Post> {
        self.state.lock().favorites.clone()
    }

    pub fn post(&self, post_id: Snowflake) -> Option<Post> {
        self.state.lock().find(post_id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn is_loading_more(&self) -> bool {
        self.state.lock().loading_more
    }

    pub fn has_more(&self) -> bool {
        self.state.lock().has_more
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}
