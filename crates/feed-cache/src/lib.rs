//! # feed-cache
//!
//! Application layer: the paginated feed, comment thread and reaction tally
//! caches, the enrichment pipeline, media uploads and the viewer session.

pub mod dto;
pub mod services;

pub use dto::{CreateCommentRequest, CreatePostRequest, UploadFile, UploadedFile};
pub use services::{
    CommentThreadCache, EnrichmentPipeline, FeedCache, MediaService, Outcome, ReactionTallyCache,
    ServiceError, ServiceResult, SyncContext, SyncContextBuilder, ViewerSession,
};
