//! User model -> profile mapper

use feed_core::entities::Profile;
use feed_core::value_objects::Snowflake;

use crate::models::UserModel;

impl From<UserModel> for Profile {
    fn from(model: UserModel) -> Self {
        Profile {
            user_id: Snowflake::new(model.id),
            username: model.username,
            full_name: model.full_name,
            avatar_url: model.avatar_url,
            email: model.email,
            role: model.role,
        }
    }
}
