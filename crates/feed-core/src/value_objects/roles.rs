//! Viewer role flags
//!
//! The users table stores roles as a free-form string (`"admin"`,
//! `"creator,admin"`, ...). Roles are parsed into flags once, when the
//! viewer's profile is loaded.

use bitflags::bitflags;

bitflags! {
    /// Elevated roles a viewer may hold
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Roles: u8 {
        /// May publish posts from the creator tools
        const CREATOR = 1 << 0;
        /// May pin and unpin posts and comments
        const ADMIN   = 1 << 1;
    }
}

impl Roles {
    /// Parse a stored role string; unknown fragments are ignored
    pub fn parse(raw: &str) -> Self {
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .fold(Roles::empty(), |acc, part| {
                match part.to_ascii_lowercase().as_str() {
                    "admin" => acc | Roles::ADMIN,
                    "creator" => acc | Roles::CREATOR,
                    _ => acc,
                }
            })
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.contains(Roles::ADMIN)
    }

    /// Admins are implicitly creators
    #[inline]
    pub fn is_creator(&self) -> bool {
        self.intersects(Roles::CREATOR | Roles::ADMIN)
    }
}
