//! # feed-core
//!
//! Domain layer for the feed synchronization layer: entities, value objects,
//! the aggregate policy (vote deltas and ordering), and the traits the remote
//! store, session and blob storage collaborators implement.
//! This crate has zero dependencies on infrastructure.

pub mod entities;
pub mod error;
pub mod policy;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Author, Comment, Decoration, Favorite, FeedEntity, NewComment, NewPost, PinState, Post,
    Profile, Reaction, ReactionTally, Viewer, Vote, VoteSummary, AVAILABLE_EMOJIS,
};
pub use error::DomainError;
pub use policy::{apply_vote_delta, compare_entries, compare_pinned, compare_recency, SortDirection};
pub use traits::{
    BlobStorage, CommentRepository, FavoriteRepository, PageRange, PostRepository,
    ProfileRepository, ReactionRepository, RepoResult, SessionProvider, VoteRepository,
};
pub use value_objects::{EntityType, Roles, Snowflake, SnowflakeGenerator, SnowflakeParseError, VoteValue};
