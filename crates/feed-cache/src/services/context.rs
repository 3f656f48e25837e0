//! Sync context - dependency container for the caches
//!
//! Holds the remote store repositories, the blob storage collaborator, the id
//! generator and the cache policy.

use std::sync::Arc;

use feed_common::{FeedConfig, StorageConfig};
use feed_core::traits::{
    BlobStorage, CommentRepository, FavoriteRepository, PostRepository, ProfileRepository,
    ReactionRepository, VoteRepository,
};
use feed_core::{Snowflake, SnowflakeGenerator};

use super::error::{ServiceError, ServiceResult};

/// Sync context containing all dependencies
///
/// Cheap to clone; every cache keeps its own copy.
#[derive(Clone)]
pub struct SyncContext {
    // Repositories
    post_repo: Arc<dyn PostRepository>,
    comment_repo: Arc<dyn CommentRepository>,
    vote_repo: Arc<dyn VoteRepository>,
    favorite_repo: Arc<dyn FavoriteRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    profile_repo: Arc<dyn ProfileRepository>,

    // Collaborators
    blob_storage: Option<Arc<dyn BlobStorage>>,
    snowflake_generator: Arc<SnowflakeGenerator>,

    // Policy
    feed_config: FeedConfig,
    storage_config: StorageConfig,
}

impl SyncContext {
    /// Start building a context
    pub fn builder() -> SyncContextBuilder {
        SyncContextBuilder::new()
    }

    // === Repositories ===

    pub fn post_repo(&self) -> &dyn PostRepository {
        self.post_repo.as_ref()
    }

    pub fn comment_repo(&self) -> &dyn CommentRepository {
        self.comment_repo.as_ref()
    }

    /// Shared handle, for the enrichment pipelines
    pub fn vote_repo(&self) -> Arc<dyn VoteRepository> {
        Arc::clone(&self.vote_repo)
    }

    pub fn favorite_repo(&self) -> Arc<dyn FavoriteRepository> {
        Arc::clone(&self.favorite_repo)
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn profile_repo(&self) -> Arc<dyn ProfileRepository> {
        Arc::clone(&self.profile_repo)
    }

    // === Collaborators ===

    /// # Errors
    /// Returns `ServiceError::Internal` when no blob storage was configured
    pub fn blob_storage(&self) -> ServiceResult<&dyn BlobStorage> {
        self.blob_storage
            .as_deref()
            .ok_or_else(|| ServiceError::internal("blob storage is not configured"))
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }

    // === Policy ===

    pub fn feed_config(&self) -> &FeedConfig {
        &self.feed_config
    }

    pub fn storage_config(&self) -> &StorageConfig {
        &self.storage_config
    }
}

impl std::fmt::Debug for SyncContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("repositories", &"...")
            .field("blob_storage", &self.blob_storage.is_some())
            .field("worker_id", &self.snowflake_generator.worker_id())
            .field("feed_config", &self.feed_config)
            .field("storage_config", &self.storage_config)
            .finish()
    }
}

/// Builder for creating SyncContext with custom configuration
#[derive(Default)]
pub struct SyncContextBuilder {
    post_repo: Option<Arc<dyn PostRepository>>,
    comment_repo: Option<Arc<dyn CommentRepository>>,
    vote_repo: Option<Arc<dyn VoteRepository>>,
    favorite_repo: Option<Arc<dyn FavoriteRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    profile_repo: Option<Arc<dyn ProfileRepository>>,
    blob_storage: Option<Arc<dyn BlobStorage>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
    feed_config: Option<FeedConfig>,
    storage_config: Option<StorageConfig>,
}

impl SyncContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_repo(mut self, repo: Arc<dyn PostRepository>) -> Self {
        self.post_repo = Some(repo);
        self
    }

    pub fn comment_repo(mut self, repo: Arc<dyn CommentRepository>) -> Self {
        self.comment_repo = Some(repo);
        self
    }

    pub fn vote_repo(mut self, repo: Arc<dyn VoteRepository>) -> Self {
        self.vote_repo = Some(repo);
        self
    }

    pub fn favorite_repo(mut self, repo: Arc<dyn FavoriteRepository>) -> Self {
        self.favorite_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn profile_repo(mut self, repo: Arc<dyn ProfileRepository>) -> Self {
        self.profile_repo = Some(repo);
        self
    }

    pub fn blob_storage(mut self, storage: Arc<dyn BlobStorage>) -> Self {
        self.blob_storage = Some(storage);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    pub fn feed_config(mut self, config: FeedConfig) -> Self {
        self.feed_config = Some(config);
        self
    }

    pub fn storage_config(mut self, config: StorageConfig) -> Self {
        self.storage_config = Some(config);
        self
    }

    /// Build the SyncContext
    ///
    /// Blob storage is optional; generator and policies fall back to defaults.
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any repository is missing or the page size is zero
    pub fn build(self) -> ServiceResult<SyncContext> {
        let feed_config = self.feed_config.unwrap_or_default();
        if feed_config.page_size == 0 {
            return Err(ServiceError::validation("page_size must be positive"));
        }

        Ok(SyncContext {
            post_repo: self
                .post_repo
                .ok_or_else(|| ServiceError::validation("post_repo is required"))?,
            comment_repo: self
                .comment_repo
                .ok_or_else(|| ServiceError::validation("comment_repo is required"))?,
            vote_repo: self
                .vote_repo
                .ok_or_else(|| ServiceError::validation("vote_repo is required"))?,
            favorite_repo: self
                .favorite_repo
                .ok_or_else(|| ServiceError::validation("favorite_repo is required"))?,
            reaction_repo: self
                .reaction_repo
                .ok_or_else(|| ServiceError::validation("reaction_repo is required"))?,
            profile_repo: self
                .profile_repo
                .ok_or_else(|| ServiceError::validation("profile_repo is required"))?,
            blob_storage: self.blob_storage,
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
            feed_config,
            storage_config: self.storage_config.unwrap_or_default(),
        })
    }
}
