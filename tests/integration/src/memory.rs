//! In-memory remote store, session and blob storage
//!
//! Every trait call counts one round trip under its operation name, can be
//! delayed to force interleavings, and can be made to fail on demand.
//! Timestamps come from a deterministic clock that advances one minute per
//! insert.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;

use feed_core::policy::{sort_entries, SortDirection};
use feed_core::traits::{
    BlobStorage, CommentRepository, FavoriteRepository, PageRange, PostRepository,
    ProfileRepository, ReactionRepository, RepoResult, SessionProvider, VoteRepository,
};
use feed_core::{
    Comment, DomainError, EntityType, Favorite, FeedEntity, NewComment, NewPost, PinState, Post,
    Profile, Reaction, Snowflake, Vote, VoteValue,
};

/// Operation names used by the round-trip counters and failure injection
pub mod ops {
    pub const POST_PAGE: &str = "posts.find_page";
    pub const POST_BY_ID: &str = "posts.find_by_id";
    pub const POST_BY_IDS: &str = "posts.find_by_ids";
    pub const POST_CREATE: &str = "posts.create";
    pub const POST_DELETE: &str = "posts.delete";
    pub const POST_PIN: &str = "posts.update_pin";

    pub const COMMENT_THREAD: &str = "comments.find_by_post";
    pub const COMMENT_CREATE: &str = "comments.create";
    pub const COMMENT_DELETE: &str = "comments.delete";
    pub const COMMENT_PIN: &str = "comments.update_pin";
    pub const COMMENT_COUNT: &str = "comments.count_by_post";

    pub const VOTE_LOOKUP: &str = "votes.find_by_entities";
    pub const VOTE_UPSERT: &str = "votes.upsert";
    pub const VOTE_DELETE: &str = "votes.delete";

    pub const FAVORITE_LOOKUP: &str = "favorites.find_for_posts";
    pub const FAVORITE_BY_USER: &str = "favorites.find_by_user";
    pub const FAVORITE_CREATE: &str = "favorites.create";
    pub const FAVORITE_DELETE: &str = "favorites.delete";

    pub const REACTION_BY_ENTITY: &str = "reactions.find_by_entity";
    pub const REACTION_BY_ENTITIES: &str = "reactions.find_by_entities";
    pub const REACTION_CREATE: &str = "reactions.create";
    pub const REACTION_DELETE: &str = "reactions.delete";

    pub const PROFILE_LOOKUP: &str = "profiles.find_by_user";
}

#[derive(Default)]
struct Tables {
    users: HashMap<Snowflake, Profile>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    votes: Vec<(EntityType, Vote)>,
    favorites: Vec<Favorite>,
    reactions: Vec<Reaction>,
}

impl Tables {
    fn joined_post(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.author = self.users.get(&post.user_id).map(Profile::author);
        post
    }

    fn joined_comment(&self, comment: &Comment) -> Comment {
        let mut comment = comment.clone();
        comment.author = self.users.get(&comment.user_id).map(Profile::author);
        comment
    }

    /// Remove comments and everything hanging off them
    fn drop_comments(&mut self, mut doomed: HashSet<Snowflake>) {
        loop {
            let replies: Vec<Snowflake> = self
                .comments
                .iter()
                .filter(|c| c.parent_id.is_some_and(|p| doomed.contains(&p)) && !doomed.contains(&c.id))
                .map(|c| c.id)
                .collect();
            if replies.is_empty() {
                break;
            }
            doomed.extend(replies);
        }

        self.comments.retain(|c| !doomed.contains(&c.id));
        self.votes.retain(|(kind, v)| {
            !(*kind == EntityType::Comment && doomed.contains(&v.entity_id))
        });
        self.reactions.retain(|r| {
            !(r.entity_type == EntityType::Comment && doomed.contains(&r.entity_id))
        });
    }
}

/// Remote store double implementing every repository trait
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    latency: Mutex<Option<Duration>>,
    ticks: AtomicI64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            calls: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            latency: Mutex::new(None),
            ticks: AtomicI64::new(0),
        }
    }

    // === Instrumentation ===

    /// Round trips made under `op`
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    /// Make every later call to `op` fail with a database error
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().remove(op);
    }

    /// Suspend every call for `latency` before it answers
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = Some(latency);
    }

    /// Next instant of the store clock
    pub fn tick(&self) -> DateTime<Utc> {
        let minutes = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        base_time() + chrono::Duration::minutes(minutes)
    }

    async fn begin(&self, op: &'static str) -> RepoResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.lock().contains(op) {
            return Err(DomainError::DatabaseError(format!("injected failure in {op}")));
        }
        Ok(())
    }

    // === Seeding ===

    pub fn add_user(&self, id: Snowflake, username: &str, role: Option<&str>) -> Profile {
        let profile = Profile {
            user_id: id,
            username: username.to_string(),
            full_name: Some(format!("{username} Example")),
            avatar_url: None,
            email: Some(format!("{username}@example.com")),
            role: role.map(ToString::to_string),
        };
        self.tables.lock().users.insert(id, profile.clone());
        profile
    }

    pub fn add_post(&self, id: Snowflake, user_id: Snowflake, content: &str) -> Post {
        let post = Post::new(id, user_id, content.to_string(), self.tick());
        self.tables.lock().posts.push(post.clone());
        post
    }

    /// Seed a post already pinned at `pinned_at`
    pub fn add_pinned_post(
        &self,
        id: Snowflake,
        user_id: Snowflake,
        content: &str,
        pinned_at: DateTime<Utc>,
    ) -> Post {
        let mut post = Post::new(id, user_id, content.to_string(), self.tick());
        post.set_pin(&PinState::pinned(user_id, pinned_at));
        self.tables.lock().posts.push(post.clone());
        post
    }

    pub fn add_comment(
        &self,
        id: Snowflake,
        post_id: Snowflake,
        user_id: Snowflake,
        content: &str,
        parent_id: Option<Snowflake>,
    ) -> Comment {
        let mut comment = Comment::new(id, post_id, user_id, content.to_string(), self.tick());
        comment.parent_id = parent_id;
        self.tables.lock().comments.push(comment.clone());
        comment
    }

    pub fn add_vote(&self, entity_type: EntityType, entity_id: Snowflake, user_id: Snowflake, value: VoteValue) {
        let mut tables = self.tables.lock();
        tables
            .votes
            .retain(|(kind, v)| !(*kind == entity_type && v.entity_id == entity_id && v.user_id == user_id));
        tables.votes.push((entity_type, Vote::new(entity_id, user_id, value)));
    }

    pub fn add_favorite(&self, post_id: Snowflake, user_id: Snowflake) {
        let favorite = Favorite {
            post_id,
            user_id,
            created_at: self.tick(),
        };
        self.tables.lock().favorites.push(favorite);
    }

    pub fn add_reaction(&self, entity_type: EntityType, entity_id: Snowflake, user_id: Snowflake, emoji: &str) {
        let mut reaction = Reaction::new(
            Snowflake::new(self.ticks.load(Ordering::SeqCst) + 1_000_000),
            entity_id,
            entity_type,
            user_id,
            emoji.to_string(),
        );
        reaction.created_at = self.tick();
        self.tables.lock().reactions.push(reaction);
    }

    // === Inspection ===

    pub fn vote_of(&self, entity_type: EntityType, entity_id: Snowflake, user_id: Snowflake) -> Option<VoteValue> {
        self.tables
            .lock()
            .votes
            .iter()
            .find(|(kind, v)| *kind == entity_type && v.entity_id == entity_id && v.user_id == user_id)
            .map(|(_, v)| v.value)
    }

    /// (upvotes, downvotes) as stored
    pub fn vote_counts(&self, entity_type: EntityType, entity_id: Snowflake) -> (u32, u32) {
        self.tables
            .lock()
            .votes
            .iter()
            .filter(|(kind, v)| *kind == entity_type && v.entity_id == entity_id)
            .fold((0, 0), |(up, down), (_, v)| match v.value {
                VoteValue::Up => (up + 1, down),
                VoteValue::Down => (up, down + 1),
            })
    }

    pub fn is_favorite(&self, post_id: Snowflake, user_id: Snowflake) -> bool {
        self.tables
            .lock()
            .favorites
            .iter()
            .any(|f| f.post_id == post_id && f.user_id == user_id)
    }

    pub fn favorite_rows(&self, user_id: Snowflake) -> usize {
        self.tables
            .lock()
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id)
            .count()
    }

    pub fn has_post(&self, post_id: Snowflake) -> bool {
        self.tables.lock().posts.iter().any(|p| p.id == post_id)
    }

    pub fn comment_ids(&self, post_id: Snowflake) -> Vec<Snowflake> {
        self.tables
            .lock()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect()
    }

    pub fn reaction_rows(&self, entity_type: EntityType, entity_id: Snowflake) -> usize {
        self.tables
            .lock()
            .reactions
            .iter()
            .filter(|r| r.entity_type == entity_type && r.entity_id == entity_id)
            .count()
    }
}

/// Midnight UTC, 1 January 2025
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

// ============================================================================
// Repository implementations
// ============================================================================

#[async_trait]
impl PostRepository for MemoryStore {
    async fn find_page(&self, range: PageRange) -> RepoResult<Vec<Post>> {
        self.begin(ops::POST_PAGE).await?;
        let tables = self.tables.lock();
        let mut rows: Vec<Post> = tables.posts.iter().map(|p| tables.joined_post(p)).collect();
        sort_entries(&mut rows, SortDirection::Descending);
        Ok(rows
            .into_iter()
            .skip(usize::try_from(range.from).unwrap_or(0))
            .take(usize::try_from(range.len()).unwrap_or(0))
            .collect())
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        self.begin(ops::POST_BY_ID).await?;
        let tables = self.tables.lock();
        Ok(tables.posts.iter().find(|p| p.id == id).map(|p| tables.joined_post(p)))
    }

    async fn find_by_ids(&self, ids: &[Snowflake]) -> RepoResult<Vec<Post>> {
        self.begin(ops::POST_BY_IDS).await?;
        let tables = self.tables.lock();
        Ok(tables
            .posts
            .iter()
            .filter(|p| ids.contains(&p.id))
            .map(|p| tables.joined_post(p))
            .collect())
    }

    async fn create(&self, post: &NewPost) -> RepoResult<Post> {
        self.begin(ops::POST_CREATE).await?;
        let mut row = Post::new(post.id, post.user_id, post.content.clone(), self.tick());
        row.image_url.clone_from(&post.image_url);

        let mut tables = self.tables.lock();
        tables.posts.push(row.clone());
        Ok(tables.joined_post(&row))
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.begin(ops::POST_DELETE).await?;
        let mut tables = self.tables.lock();
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(DomainError::PostNotFound(id));
        }

        let comments: HashSet<Snowflake> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == id)
            .map(|c| c.id)
            .collect();
        tables.drop_comments(comments);
        tables
            .votes
            .retain(|(kind, v)| !(*kind == EntityType::Post && v.entity_id == id));
        tables.favorites.retain(|f| f.post_id != id);
        tables
            .reactions
            .retain(|r| !(r.entity_type == EntityType::Post && r.entity_id == id));
        Ok(())
    }

    async fn update_pin(&self, id: Snowflake, pin: &PinState) -> RepoResult<Post> {
        self.begin(ops::POST_PIN).await?;
        let mut tables = self.tables.lock();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::PostNotFound(id))?;
        post.set_pin(pin);
        let post = post.clone();
        Ok(tables.joined_post(&post))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_by_post(&self, post_id: Snowflake) -> RepoResult<Vec<Comment>> {
        self.begin(ops::COMMENT_THREAD).await?;
        let tables = self.tables.lock();
        let mut rows: Vec<Comment> = tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| tables.joined_comment(c))
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        self.begin(ops::COMMENT_CREATE).await?;
        let created_at = self.tick();

        let mut tables = self.tables.lock();
        if !tables.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id));
        }
        if let Some(parent_id) = comment.parent_id {
            if !tables.comments.iter().any(|c| c.id == parent_id) {
                return Err(DomainError::CommentNotFound(parent_id));
            }
        }

        let mut row = Comment::new(
            comment.id,
            comment.post_id,
            comment.user_id,
            comment.content.clone(),
            created_at,
        );
        row.parent_id = comment.parent_id;
        tables.comments.push(row.clone());
        Ok(tables.joined_comment(&row))
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.begin(ops::COMMENT_DELETE).await?;
        let mut tables = self.tables.lock();
        if !tables.comments.iter().any(|c| c.id == id) {
            return Err(DomainError::CommentNotFound(id));
        }
        tables.drop_comments(HashSet::from([id]));
        Ok(())
    }

    async fn update_pin(&self, id: Snowflake, pin: &PinState) -> RepoResult<Comment> {
        self.begin(ops::COMMENT_PIN).await?;
        let mut tables = self.tables.lock();
        let comment = tables
            .comments
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DomainError::CommentNotFound(id))?;
        comment.set_pin(pin);
        let comment = comment.clone();
        Ok(tables.joined_comment(&comment))
    }

    async fn count_by_post(&self, post_id: Snowflake) -> RepoResult<i64> {
        self.begin(ops::COMMENT_COUNT).await?;
        let count = self
            .tables
            .lock()
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl VoteRepository for MemoryStore {
    async fn find_by_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[Snowflake],
    ) -> RepoResult<Vec<Vote>> {
        self.begin(ops::VOTE_LOOKUP).await?;
        Ok(self
            .tables
            .lock()
            .votes
            .iter()
            .filter(|(kind, v)| *kind == entity_type && entity_ids.contains(&v.entity_id))
            .map(|(_, v)| *v)
            .collect())
    }

    async fn upsert(&self, entity_type: EntityType, vote: &Vote) -> RepoResult<()> {
        self.begin(ops::VOTE_UPSERT).await?;
        let mut tables = self.tables.lock();
        tables.votes.retain(|(kind, v)| {
            !(*kind == entity_type && v.entity_id == vote.entity_id && v.user_id == vote.user_id)
        });
        tables.votes.push((entity_type, *vote));
        Ok(())
    }

    async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<()> {
        self.begin(ops::VOTE_DELETE).await?;
        self.tables.lock().votes.retain(|(kind, v)| {
            !(*kind == entity_type && v.entity_id == entity_id && v.user_id == user_id)
        });
        Ok(())
    }
}

#[async_trait]
impl FavoriteRepository for MemoryStore {
    async fn find_for_posts(
        &self,
        user_id: Snowflake,
        post_ids: &[Snowflake],
    ) -> RepoResult<Vec<Favorite>> {
        self.begin(ops::FAVORITE_LOOKUP).await?;
        Ok(self
            .tables
            .lock()
            .favorites
            .iter()
            .filter(|f| f.user_id == user_id && post_ids.contains(&f.post_id))
            .cloned()
            .collect())
    }

    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Favorite>> {
        self.begin(ops::FAVORITE_BY_USER).await?;
        let mut rows: Vec<Favorite> = self
            .tables
            .lock()
            .favorites
            .iter()
            .rev()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create(&self, favorite: &Favorite) -> RepoResult<Favorite> {
        self.begin(ops::FAVORITE_CREATE).await?;
        let mut tables = self.tables.lock();
        let existing = tables
            .favorites
            .iter()
            .find(|f| f.post_id == favorite.post_id && f.user_id == favorite.user_id)
            .copied();
        match existing {
            Some(stored) => Ok(stored),
            None => {
                tables.favorites.push(*favorite);
                Ok(*favorite)
            }
        }
    }

    async fn delete(&self, post_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.begin(ops::FAVORITE_DELETE).await?;
        self.tables
            .lock()
            .favorites
            .retain(|f| !(f.post_id == post_id && f.user_id == user_id));
        Ok(())
    }
}

#[async_trait]
impl ReactionRepository for MemoryStore {
    async fn find_by_entity(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
    ) -> RepoResult<Vec<Reaction>> {
        self.begin(ops::REACTION_BY_ENTITY).await?;
        Ok(self
            .tables
            .lock()
            .reactions
            .iter()
            .filter(|r| r.entity_type == entity_type && r.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn find_by_entities(
        &self,
        entity_type: EntityType,
        entity_ids: &[Snowflake],
    ) -> RepoResult<Vec<Reaction>> {
        self.begin(ops::REACTION_BY_ENTITIES).await?;
        Ok(self
            .tables
            .lock()
            .reactions
            .iter()
            .filter(|r| r.entity_type == entity_type && entity_ids.contains(&r.entity_id))
            .cloned()
            .collect())
    }

    async fn create(&self, reaction: &Reaction) -> RepoResult<()> {
        self.begin(ops::REACTION_CREATE).await?;
        let mut tables = self.tables.lock();
        let duplicate = tables.reactions.iter().any(|r| {
            r.entity_type == reaction.entity_type
                && r.entity_id == reaction.entity_id
                && r.user_id == reaction.user_id
                && r.emoji == reaction.emoji
        });
        if duplicate {
            return Err(DomainError::ReactionAlreadyExists);
        }
        tables.reactions.push(reaction.clone());
        Ok(())
    }

    async fn delete(
        &self,
        entity_type: EntityType,
        entity_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<()> {
        self.begin(ops::REACTION_DELETE).await?;
        self.tables.lock().reactions.retain(|r| {
            !(r.entity_type == entity_type
                && r.entity_id == entity_id
                && r.user_id == user_id
                && r.emoji == emoji)
        });
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for MemoryStore {
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Option<Profile>> {
        self.begin(ops::PROFILE_LOOKUP).await?;
        Ok(self.tables.lock().users.get(&user_id).cloned())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Session provider answering with a fixed user
pub struct StaticSession {
    user: Mutex<Option<Snowflake>>,
    calls: AtomicUsize,
    latency: Option<Duration>,
    failing: AtomicBool,
}

impl StaticSession {
    pub fn signed_in(user_id: Snowflake) -> Self {
        Self {
            user: Mutex::new(Some(user_id)),
            calls: AtomicUsize::new(0),
            latency: None,
            failing: AtomicBool::new(false),
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: Mutex::new(None),
            calls: AtomicUsize::new(0),
            latency: None,
            failing: AtomicBool::new(false),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_user(&self, user_id: Option<Snowflake>) {
        *self.user.lock() = user_id;
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_user(&self) -> RepoResult<Option<Snowflake>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::SessionError("session expired".to_string()));
        }
        Ok(*self.user.lock())
    }
}

// ============================================================================
// Blob storage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub size: usize,
    pub content_type: String,
}

/// Blob storage keeping objects in a map keyed by (bucket, path)
pub struct MemoryBlobStorage {
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    uploads: AtomicUsize,
    public_urls: AtomicBool,
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStorage {
    pub const BASE_URL: &'static str = "https://cdn.example.test";

    pub fn new() -> Self {
        Self {
            objects: Mutex::new(HashMap::new()),
            uploads: AtomicUsize::new(0),
            public_urls: AtomicBool::new(true),
        }
    }

    /// Storage that accepts uploads but never hands out a public URL
    pub fn without_public_urls() -> Self {
        let storage = Self::new();
        storage.public_urls.store(false, Ordering::SeqCst);
        storage
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn object(&self, bucket: &str, path: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    pub fn paths(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, path)| path.clone())
            .collect()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> RepoResult<()> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let key = (bucket.to_string(), path.to_string());
        let mut objects = self.objects.lock();
        if !upsert && objects.contains_key(&key) {
            return Err(DomainError::StorageError(format!("{bucket}/{path} already exists")));
        }
        objects.insert(
            key,
            StoredObject {
                size: bytes.len(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> Option<String> {
        self.public_urls
            .load(Ordering::SeqCst)
            .then(|| format!("{}/{bucket}/{path}", Self::BASE_URL))
    }
}
