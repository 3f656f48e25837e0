//! Data transfer objects accepted and returned by the caches

mod requests;
mod responses;

pub use requests::{CreateCommentRequest, CreatePostRequest, UploadFile, MAX_CONTENT_LENGTH};
pub use responses::UploadedFile;
