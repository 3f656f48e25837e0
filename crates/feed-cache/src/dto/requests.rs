//! Request DTOs
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use feed_core::Snowflake;

/// Longest post or comment body accepted
pub const MAX_CONTENT_LENGTH: usize = 5000;

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Content must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Create post request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 5000, message = "Content must be at most 5000 characters")
    )]
    pub content: String,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

impl CreatePostRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image_url: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Create comment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub post_id: Snowflake,

    #[validate(
        custom(function = "not_blank"),
        length(max = 5000, message = "Content must be at most 5000 characters")
    )]
    pub content: String,

    /// Comment being replied to, if any
    pub parent_id: Option<Snowflake>,
}

/// A file handed over for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Text after the last dot of the file name, or the whole name when there is none
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}
