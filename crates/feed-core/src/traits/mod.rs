//! Collaborator traits (ports)

mod repositories;

pub use repositories::{
    BlobStorage, CommentRepository, FavoriteRepository, PageRange, PostRepository,
    ProfileRepository, ReactionRepository, RepoResult, SessionProvider, VoteRepository,
};
