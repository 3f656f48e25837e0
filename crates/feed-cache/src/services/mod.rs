//! Caches and services
//!
//! Each cache mirrors one slice of the remote store and pushes local
//! mutations back to it. Every public operation returns an [`Outcome`].

pub mod comments;
pub mod context;
pub mod enrichment;
pub mod error;
pub mod feed;
pub mod media;
pub mod outcome;
pub mod permission;
pub mod reactions;
pub mod session;

// Re-export all services for convenience
pub use comments::CommentThreadCache;
pub use context::{SyncContext, SyncContextBuilder};
pub use enrichment::EnrichmentPipeline;
pub use error::{ServiceError, ServiceResult};
pub use feed::FeedCache;
pub use media::MediaService;
pub use outcome::Outcome;
pub use reactions::ReactionTallyCache;
pub use session::ViewerSession;
