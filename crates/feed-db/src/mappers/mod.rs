//! Entity to model mappers
//!
//! Conversions between domain entities (feed-core) and database models.
//! - `From<Model> for Entity` / `TryFrom<Model> for Entity`: rows to domain objects
//! - `*Insert` structs: entity data prepared for binding

mod comment;
mod post;
mod reaction;
mod user;
mod vote;

use feed_core::entities::Author;

pub use comment::CommentInsert;
pub use post::PostInsert;
pub use reaction::ReactionInsert;

/// Author display fields exist only when the left join found a user
fn joined_author(
    username: Option<String>,
    full_name: Option<String>,
    avatar_url: Option<String>,
) -> Option<Author> {
    username.map(|username| Author {
        username,
        full_name,
        avatar_url,
    })
}
