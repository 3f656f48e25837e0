//! Comment thread cache
//!
//! One flat, ordered comment list per post (replies link to their parent by
//! id), a per-post comment count, and a reverse index from comment id to the
//! post that owns it.

use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use feed_core::entities::{Comment, FeedEntity, NewComment, PinState};
use feed_core::policy::{apply_vote_delta, sort_entries, SortDirection};
use feed_core::{EntityType, Snowflake, Viewer, Vote, VoteValue};

use crate::dto::CreateCommentRequest;

use super::context::SyncContext;
use super::enrichment::{EnrichmentPipeline, ViewerScope};
use super::error::{ServiceError, ServiceResult};
use super::outcome::Outcome;
use super::permission::{require_admin, require_id, require_viewer};

#[derive(Debug, Default)]
struct ThreadState {
    comments: Vec<Comment>,
    loading: bool,
    error: Option<String>,
    loaded: bool,
    /// Viewer the thread's `user_vote`s were read for
    scope: ViewerScope,
}

/// Comment thread cache
pub struct CommentThreadCache {
    ctx: SyncContext,
    enrichment: EnrichmentPipeline,
    threads: DashMap<Snowflake, ThreadState>,
    counts: DashMap<Snowflake, u64>,
    /// comment id -> post id
    owners: DashMap<Snowflake, Snowflake>,
}

impl CommentThreadCache {
    pub fn new(ctx: SyncContext) -> Self {
        let enrichment = EnrichmentPipeline::for_comments(ctx.vote_repo());
        Self {
            ctx,
            enrichment,
            threads: DashMap::new(),
            counts: DashMap::new(),
            owners: DashMap::new(),
        }
    }

    /// Load a post's whole thread, oldest first with pinned comments on top
    #[instrument(skip(self, viewer))]
    pub async fn fetch_comments(&self, viewer: Option<Viewer>, post_id: Snowflake) -> Outcome<Vec<Comment>> {
        self.try_fetch_comments(viewer, post_id).await.into()
    }

    async fn try_fetch_comments(&self, viewer: Option<Viewer>, post_id: Snowflake) -> ServiceResult<Vec<Comment>> {
        require_id(post_id, "post")?;

        {
            let mut thread = self.threads.entry(post_id).or_default();
            thread.loading = true;
            thread.error = None;
        }

        let result = self.load_thread(viewer, post_id).await;

        let mut thread = self.threads.entry(post_id).or_default();
        thread.loading = false;
        match result {
            Ok(comments) => {
                self.owners.retain(|_, owner| *owner != post_id);
                for comment in &comments {
                    self.owners.insert(comment.id, post_id);
                }
                self.counts.insert(post_id, comments.len() as u64);

                thread.comments.clone_from(&comments);
                thread.loaded = true;
                thread.scope = ViewerScope::default();
                thread.scope.record(viewer.map(|v| v.id));

                debug!(post_id = %post_id, count = comments.len(), "Comment thread loaded");
                Ok(comments)
            }
            Err(e) => {
                thread.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn load_thread(&self, viewer: Option<Viewer>, post_id: Snowflake) -> ServiceResult<Vec<Comment>> {
        let mut comments = self.ctx.comment_repo().find_by_post(post_id).await?;
        self.enrichment.apply(&mut comments, viewer.map(|v| v.id)).await;
        sort_entries(&mut comments, SortDirection::Ascending);
        Ok(comments)
    }

    /// Insert a comment (optionally a reply) and append it to the thread
    #[instrument(skip(self, viewer, content))]
    pub async fn add_comment(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        content: &str,
        parent_id: Option<Snowflake>,
    ) -> Outcome<Comment> {
        let request = CreateCommentRequest {
            post_id,
            content: content.to_string(),
            parent_id,
        };
        self.try_add_comment(viewer, request).await.into()
    }

    async fn try_add_comment(&self, viewer: Option<Viewer>, request: CreateCommentRequest) -> ServiceResult<Comment> {
        let post_id = require_id(request.post_id, "post")?;
        if let Some(parent_id) = request.parent_id {
            require_id(parent_id, "comment")?;
        }
        request.validate()?;
        let viewer = require_viewer(viewer)?;

        let new_comment = NewComment {
            id: self.ctx.generate_id(),
            post_id,
            parent_id: request.parent_id,
            user_id: viewer.id,
            content: request.content.trim().to_string(),
        };

        let mut comment = self.ctx.comment_repo().create(&new_comment).await?;
        self.enrichment
            .apply(std::slice::from_mut(&mut comment), Some(viewer.id))
            .await;

        let thread_len = {
            let mut thread = self.threads.entry(post_id).or_default();
            thread.comments.retain(|c| c.id != comment.id);
            thread.comments.push(comment.clone());
            sort_entries(&mut thread.comments, SortDirection::Ascending);
            thread.comments.len() as u64
        };
        self.owners.insert(comment.id, post_id);
        self.counts
            .entry(post_id)
            .and_modify(|count| *count += 1)
            .or_insert(thread_len);

        info!(comment_id = %comment.id, post_id = %post_id, user_id = %viewer.id, "Comment added");
        Ok(comment)
    }

    /// Remote delete, then refetch the owning thread
    #[instrument(skip(self, viewer))]
    pub async fn delete_comment(&self, viewer: Option<Viewer>, comment_id: Snowflake) -> Outcome<()> {
        self.try_delete_comment(viewer, comment_id).await.into()
    }

    async fn try_delete_comment(&self, viewer: Option<Viewer>, comment_id: Snowflake) -> ServiceResult<()> {
        let current = require_viewer(viewer)?;
        require_id(comment_id, "comment")?;

        let owner = self.owners.get(&comment_id).map(|entry| *entry.value());

        self.ctx.comment_repo().delete(comment_id).await?;
        self.owners.remove(&comment_id);

        info!(comment_id = %comment_id, user_id = %current.id, "Comment deleted");

        if let Some(post_id) = owner {
            // Replies may have cascaded with the comment, so the thread is re-read whole
            if let Err(e) = self.try_fetch_comments(viewer, post_id).await {
                warn!(post_id = %post_id, error = %e, "Thread refetch after delete failed");
            }
        }

        Ok(())
    }

    /// Same toggle contract as post votes, scoped to one thread
    #[instrument(skip(self, viewer))]
    pub async fn toggle_comment_vote(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        comment_id: Snowflake,
        value: VoteValue,
    ) -> Outcome<i16> {
        self.try_toggle_comment_vote(viewer, post_id, comment_id, value)
            .await
            .into()
    }

    async fn try_toggle_comment_vote(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        comment_id: Snowflake,
        value: VoteValue,
    ) -> ServiceResult<i16> {
        let viewer = require_viewer(viewer)?;
        require_id(post_id, "post")?;
        require_id(comment_id, "comment")?;

        let (cached, own_scope) = {
            let thread = self
                .threads
                .get(&post_id)
                .ok_or_else(|| ServiceError::not_found("Comment", comment_id.to_string()))?;
            let comment = thread
                .comments
                .iter()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| ServiceError::not_found("Comment", comment_id.to_string()))?;
            (
                (comment.user_vote, comment.vote_summary),
                thread.scope.admits(Some(viewer.id)),
            )
        };
        let (old_vote, summary) = if own_scope {
            cached
        } else {
            debug!(comment_id = %comment_id, user_id = %viewer.id, "Thread was loaded for another viewer, reading the store");
            self.enrichment.current_vote(comment_id, viewer.id).await?
        };

        let new_vote = if old_vote == value.as_i16() { 0 } else { value.as_i16() };
        let votes = self.ctx.vote_repo();
        if new_vote == 0 {
            votes.delete(EntityType::Comment, comment_id, viewer.id).await?;
        } else {
            votes
                .upsert(EntityType::Comment, &Vote::new(comment_id, viewer.id, value))
                .await?;
        }

        let patched = apply_vote_delta(summary, old_vote, new_vote);
        if let Some(mut thread) = self.threads.get_mut(&post_id) {
            let own_scope = thread.scope.admits(Some(viewer.id));
            if own_scope {
                thread.scope.record(Some(viewer.id));
            }
            if let Some(comment) = thread.comments.iter_mut().find(|c| c.id == comment_id) {
                if own_scope {
                    comment.set_vote(patched, new_vote);
                } else {
                    comment.vote_summary = patched;
                }
            }
        }

        info!(comment_id = %comment_id, post_id = %post_id, old_vote, new_vote, "Comment vote toggled");
        Ok(new_vote)
    }

    /// Pin or unpin a comment (admins only), then resort its thread
    #[instrument(skip(self, viewer))]
    pub async fn toggle_comment_pin(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        comment_id: Snowflake,
        should_pin: bool,
    ) -> Outcome<Comment> {
        self.try_toggle_comment_pin(viewer, post_id, comment_id, should_pin)
            .await
            .into()
    }

    async fn try_toggle_comment_pin(
        &self,
        viewer: Option<Viewer>,
        post_id: Snowflake,
        comment_id: Snowflake,
        should_pin: bool,
    ) -> ServiceResult<Comment> {
        let viewer = require_admin(viewer)?;
        require_id(post_id, "post")?;
        require_id(comment_id, "comment")?;

        let pin = if should_pin {
            PinState::pinned(viewer.id, Utc::now())
        } else {
            PinState::unpinned()
        };

        let updated = self.ctx.comment_repo().update_pin(comment_id, &pin).await?;
        let stored = PinState {
            is_pinned: updated.is_pinned,
            pinned_by: updated.pinned_by,
            pinned_at: updated.pinned_at,
        };

        let cached = self.threads.get_mut(&post_id).and_then(|mut thread| {
            if let Some(comment) = thread.comments.iter_mut().find(|c| c.id == comment_id) {
                comment.set_pin(&stored);
            }
            sort_entries(&mut thread.comments, SortDirection::Ascending);
            if !thread.scope.admits(Some(viewer.id)) {
                return None;
            }
            thread.comments.iter().find(|c| c.id == comment_id).cloned()
        });

        info!(comment_id = %comment_id, admin_id = %viewer.id, pinned = stored.is_pinned, "Comment pin updated");
        if let Some(comment) = cached {
            return Ok(comment);
        }

        let mut comment = updated;
        self.enrichment
            .apply(std::slice::from_mut(&mut comment), Some(viewer.id))
            .await;
        Ok(comment)
    }

    /// Exact count from the store, without loading the thread
    #[instrument(skip(self))]
    pub async fn fetch_comment_count(&self, post_id: Snowflake) -> Outcome<u64> {
        self.try_fetch_comment_count(post_id).await.into()
    }

    async fn try_fetch_comment_count(&self, post_id: Snowflake) -> ServiceResult<u64> {
        require_id(post_id, "post")?;

        let count = self.ctx.comment_repo().count_by_post(post_id).await?;
        let count = u64::try_from(count).unwrap_or(0);
        self.counts.insert(post_id, count);
        Ok(count)
    }

    /// Cached count if there is one, otherwise [`Self::fetch_comment_count`]
    pub async fn ensure_comment_count(&self, post_id: Snowflake) -> Outcome<u64> {
        if let Some(count) = self.counts.get(&post_id).map(|entry| *entry.value()) {
            return Outcome::ok(count);
        }
        self.fetch_comment_count(post_id).await
    }

    // === Accessors ===

    pub fn comments_for_post(&self, post_id: Snowflake) -> Vec<Comment> {
        self.threads
            .get(&post_id)
            .map(|thread| thread.comments.clone())
            .unwrap_or_default()
    }

    /// Stored count, else the length of the loaded thread
    pub fn comment_count(&self, post_id: Snowflake) -> u64 {
        if let Some(count) = self.counts.get(&post_id) {
            return *count;
        }
        self.threads
            .get(&post_id)
            .map_or(0, |thread| thread.comments.len() as u64)
    }

    pub fn is_loading(&self, post_id: Snowflake) -> bool {
        self.threads.get(&post_id).is_some_and(|thread| thread.loading)
    }

    pub fn error(&self, post_id: Snowflake) -> Option<String> {
        self.threads.get(&post_id).and_then(|thread| thread.error.clone())
    }

    pub fn has_loaded(&self, post_id: Snowflake) -> bool {
        self.threads.get(&post_id).is_some_and(|thread| thread.loaded)
    }

    pub fn has_count(&self, post_id: Snowflake) -> bool {
        self.counts.contains_key(&post_id)
    }

    /// Post that owns a cached comment
    pub fn owner_of(&self, comment_id: Snowflake) -> Option<Snowflake> {
        self.owners.get(&comment_id).map(|entry| *entry.value())
    }
}
