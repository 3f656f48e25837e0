//! The person looking at the feed, and the profile row behind them

use serde::Serialize;

use crate::value_objects::{Roles, Snowflake};

/// Identity threaded explicitly into every cache operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub id: Snowflake,
    pub roles: Roles,
}

impl Viewer {
    pub fn new(id: Snowflake) -> Self {
        Self {
            id,
            roles: Roles::empty(),
        }
    }

    pub fn with_roles(mut self, roles: Roles) -> Self {
        self.roles = roles;
        self
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }
}

/// Display fields joined from the users table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Author {
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Row of the users table as seen by the viewer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: Snowflake,
    pub username: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl Profile {
    pub fn roles(&self) -> Roles {
        self.role.as_deref().map(Roles::parse).unwrap_or_default()
    }

    pub fn author(&self) -> Author {
        Author {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }
}
