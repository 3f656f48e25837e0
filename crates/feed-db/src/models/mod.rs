//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod favorite;
mod post;
mod reaction;
mod user;
mod vote;

pub use comment::CommentModel;
pub use favorite::FavoriteModel;
pub use post::PostModel;
pub use reaction::ReactionModel;
pub use user::UserModel;
pub use vote::VoteModel;
