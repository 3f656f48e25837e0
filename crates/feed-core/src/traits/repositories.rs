//! Repository traits (ports) - the remote store as seen by the caches
//!
//! Each method is one round trip. Batched lookups take the whole id set at
//! once so that decoration never degrades into per-row queries.

use async_trait::async_trait;

use crate::entities::{
    Comment, Favorite, NewComment, NewPost, PinState, Post, Profile, Reaction, Vote,
};
use crate::error::DomainError;
use crate::value_objects::{EntityType, Snowflake};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Inclusive row window over an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub from: i64,
    pub to: i64,
}

impl PageRange {
    /// Window for a zero-based page number
    pub fn for_page(page: u32, page_size: u32) -> Self {
        let from = i64::from(page) * i64::from(page_size);
        Self {
            from,
            to: from + i64::from(page_size) - 1,
        }
    }

    /// Number of rows the window can hold
    pub fn len(&self) -> i64 {
        (self.to - self.from + 1).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Rows in `range` ordered pinned desc, pinned_at desc nulls last, created_at desc
    async fn find_page(&self, range: PageRange) -> RepoResult<Vec<Post>>;

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>>;

    /// Batch select with an "id in set" predicate; order unspecified
    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Post>>;

    /// Insert and return the stored row
    async fn create(&self, post: &NewPost) -> RepoResult<Post>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Write the pin columns and return the updated row
    async fn update_pin(&self, id: Snowflake, pin: &PinState) -> RepoResult<Post>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// All comments of a post, oldest first
    async fn find_by_post(&self, post_id: Snowflake) -> RepoResult<Vec<Comment>>;

    async fn create(&self, comment: &NewComment) -> RepoResult<Comment>;

    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    async fn update_pin(&self, id: Snowflake, pin: &PinState) -> RepoResult<Comment>;

    /// Exact count without row payload
    async fn count_by_post(&self, post_id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Vote Repository
// ============================================================================

/// `post_votes` and `comment_votes`, selected by `EntityType`
#[async_trait]
pub trait VoteRepository: Send + Sync {
    async fn find_by_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[Snowflake],
    ) -> RepoResult<Vec<Vote>>;

    /// Insert or replace on (entity, user)
    async fn upsert(&self, entity_type: EntityType, vote: &Vote) -> RepoResult<()>;

    async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<()>;
}

// ============================================================================
// Favorite Repository
// ============================================================================

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// The user's favorites among `post_ids`
    async fn find_for_posts(
        &self,
        user_id: Snowflake,
        post_ids: &[Snowflake],
    ) -> RepoResult<Vec<Favorite>>;

    /// All of the user's favorites, newest first
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Favorite>>;

    /// Insert and return the stored row; an existing (post, user) row keeps
    /// its original timestamp
    async fn create(&self, favorite: &Favorite) -> RepoResult<Favorite>;

    async fn delete(&self, post_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
    ) -> RepoResult<Vec<Reaction>>;

    async fn find_by_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[Snowflake],
    ) -> RepoResult<Vec<Reaction>>;

    async fn create(&self, reaction: &Reaction) -> RepoResult<()>;

    async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<()>;
}

// ============================================================================
// Profiles and session
// ============================================================================

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Profile>>;
}

/// Authentication collaborator; only reports who is signed in
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_user(&self) -> RepoResult<Option<Snowflake>>;
}

// ============================================================================
// Blob Storage
// ============================================================================

#[async_trait]
pub trait BlobStorage: Send + Sync {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> RepoResult<()>;

    fn public_url(&self, bucket: &str, path: &str) -> Option<String>;
}
