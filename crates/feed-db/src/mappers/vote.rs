//! Vote and favorite entity <-> model mappers

use feed_core::entities::{Favorite, Vote};
use feed_core::error::DomainError;
use feed_core::value_objects::{Snowflake, VoteValue};

use crate::models::{FavoriteModel, VoteModel};

/// A stored value outside {-1, 1} is a schema violation, not a neutral vote
impl TryFrom<VoteModel> for Vote {
    type Error = DomainError;

    fn try_from(model: VoteModel) -> Result<Self, Self::Error> {
        let value = VoteValue::try_from(model.value).map_err(DomainError::DatabaseError)?;
        Ok(Vote::new(
            Snowflake::new(model.entity_id),
            Snowflake::new(model.user_id),
            value,
        ))
    }
}

impl From<FavoriteModel> for Favorite {
    fn from(model: FavoriteModel) -> Self {
        Favorite {
            post_id: Snowflake::new(model.post_id),
            user_id: Snowflake::new(model.user_id),
            created_at: model.created_at,
        }
    }
}
