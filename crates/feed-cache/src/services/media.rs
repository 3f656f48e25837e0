//! Media service - validated uploads of post images and avatars
//!
//! Size and type are checked before the blob storage is touched. Object names
//! are formed here; storage only sees the final path.

use chrono::Utc;
use rand::Rng;
use tracing::{info, instrument};

use feed_core::Viewer;

use crate::dto::{UploadFile, UploadedFile};

use super::context::SyncContext;
use super::error::{ServiceError, ServiceResult};
use super::outcome::Outcome;
use super::permission::require_viewer;

const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LENGTH: usize = 11;

pub struct MediaService {
    ctx: SyncContext,
}

impl MediaService {
    pub fn new(ctx: SyncContext) -> Self {
        Self { ctx }
    }

    /// Store an image for a post under `posts/{millis}-{random}.{ext}`
    #[instrument(skip(self, file), fields(name = %file.name, size = file.size()))]
    pub async fn upload_post_image(&self, file: &UploadFile) -> Outcome<UploadedFile> {
        self.try_upload_post_image(file).await.into()
    }

    async fn try_upload_post_image(&self, file: &UploadFile) -> ServiceResult<UploadedFile> {
        self.validate(file)?;

        let path = format!(
            "posts/{}-{}.{}",
            Utc::now().timestamp_millis(),
            random_suffix(),
            file.extension()
        );
        let bucket = &self.ctx.storage_config().post_bucket;
        self.store(bucket, path, file, false).await
    }

    /// Store the viewer's avatar under `{user_id}/avatar-{millis}.{ext}`, replacing any previous object at that path
    #[instrument(skip(self, viewer, file), fields(name = %file.name, size = file.size()))]
    pub async fn upload_avatar(&self, viewer: Option<Viewer>, file: &UploadFile) -> Outcome<UploadedFile> {
        self.try_upload_avatar(viewer, file).await.into()
    }

    async fn try_upload_avatar(&self, viewer: Option<Viewer>, file: &UploadFile) -> ServiceResult<UploadedFile> {
        let viewer = require_viewer(viewer)?;
        self.validate(file)?;

        let path = format!(
            "{}/avatar-{}.{}",
            viewer.id,
            Utc::now().timestamp_millis(),
            file.extension()
        );
        let bucket = &self.ctx.storage_config().avatar_bucket;
        self.store(bucket, path, file, true).await
    }

    fn validate(&self, file: &UploadFile) -> ServiceResult<()> {
        let config = self.ctx.storage_config();
        if file.size() > config.max_upload_bytes() {
            return Err(ServiceError::validation(format!(
                "File size must be less than {}MB",
                config.max_upload_mb
            )));
        }
        if !file.content_type.starts_with("image/") {
            return Err(ServiceError::validation("Only image files are allowed"));
        }
        Ok(())
    }

    async fn store(
        &self,
        bucket: &str,
        path: String,
        file: &UploadFile,
        upsert: bool,
    ) -> ServiceResult<UploadedFile> {
        let storage = self.ctx.blob_storage()?;
        storage
            .upload(bucket, &path, &file.bytes, &file.content_type, upsert)
            .await?;

        let url = storage
            .public_url(bucket, &path)
            .ok_or_else(|| ServiceError::internal(format!("No public URL for {bucket}/{path}")))?;

        info!(bucket, path = %path, size = file.size(), "File uploaded");
        Ok(UploadedFile {
            url,
            size: file.size(),
            path,
        })
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LENGTH)
        .map(|_| SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())] as char)
        .collect()
}
