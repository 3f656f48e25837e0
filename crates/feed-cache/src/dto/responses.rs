//! Response DTOs

use serde::Serialize;

/// A stored upload and where it can be fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub url: String,
    pub size: u64,
    pub path: String,
}
