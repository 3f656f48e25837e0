//! Value objects - immutable types that represent domain concepts

mod kinds;
mod roles;
mod snowflake;

pub use kinds::{EntityType, VoteValue};
pub use roles::Roles;
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
