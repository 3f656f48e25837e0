//! Reaction entity <-> model mapper

use feed_core::entities::Reaction;
use feed_core::error::DomainError;
use feed_core::value_objects::{EntityType, Snowflake};

use crate::models::ReactionModel;

impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        let entity_type = model
            .entity_type
            .parse::<EntityType>()
            .map_err(DomainError::DatabaseError)?;

        Ok(Reaction {
            id: Snowflake::new(model.id),
            entity_id: Snowflake::new(model.entity_id),
            entity_type,
            user_id: Snowflake::new(model.user_id),
            emoji: model.emoji,
            created_at: model.created_at,
        })
    }
}

/// Convert Reaction entity reference to values for database insertion
pub struct ReactionInsert<'a> {
    pub id: i64,
    pub entity_id: i64,
    pub entity_type: &'static str,
    pub user_id: i64,
    pub emoji: &'a str,
}

impl<'a> ReactionInsert<'a> {
    pub fn new(reaction: &'a Reaction) -> Self {
        Self {
            id: reaction.id.into_inner(),
            entity_id: reaction.entity_id.into_inner(),
            entity_type: reaction.entity_type.as_str(),
            user_id: reaction.user_id.into_inner(),
            emoji: &reaction.emoji,
        }
    }
}
