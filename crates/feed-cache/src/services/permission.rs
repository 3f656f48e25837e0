//! Permission checks
//!
//! Run before any network call, so a rejected operation never reaches the store.

use feed_core::{Snowflake, Viewer};

use super::error::{ServiceError, ServiceResult};

/// The operation needs a signed-in viewer
pub fn require_viewer(viewer: Option<Viewer>) -> ServiceResult<Viewer> {
    viewer.ok_or_else(ServiceError::unauthenticated)
}

/// Pin and unpin are reserved to admins
pub fn require_admin(viewer: Option<Viewer>) -> ServiceResult<Viewer> {
    let viewer = require_viewer(viewer)?;
    if !viewer.is_admin() {
        return Err(ServiceError::permission_denied("ADMIN"));
    }
    Ok(viewer)
}

/// Zero never names a stored row
pub fn require_id(id: Snowflake, resource: &'static str) -> ServiceResult<Snowflake> {
    if id.is_zero() {
        return Err(ServiceError::validation(format!("Invalid {resource} id")));
    }
    Ok(id)
}
