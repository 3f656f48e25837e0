//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in feed-core.
//! Each repository handles database operations for one table family.

mod comment;
mod error;
mod favorite;
mod post;
mod profile;
mod reaction;
mod vote;

pub use comment::PgCommentRepository;
pub use favorite::PgFavoriteRepository;
pub use post::PgPostRepository;
pub use profile::PgProfileRepository;
pub use reaction::PgReactionRepository;
pub use vote::PgVoteRepository;

/// Raw i64 ids for an `= ANY($n)` bind
fn id_array(ids: &[feed_core::Snowflake]) -> Vec<i64> {
    ids.iter().map(|id| id.into_inner()).collect()
}
