//! Type-safe identifiers for guilds, users, and events.
//!
//! Guild and user identifiers are chat-platform snowflakes (64-bit
//! integers); event identifiers are store-assigned primary keys. The
//! newtypes keep the three from being confused with one another.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a chat server (guild / group workspace).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(i64);

impl GuildId {
    /// Wraps a raw snowflake.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw snowflake value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for GuildId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a chat platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw snowflake.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw snowflake value.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Display-name fallback used when the membership directory cannot
    /// resolve the user.
    #[must_use]
    pub fn fallback_name(&self) -> String {
        format!("User {}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Store-assigned identifier of an event row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Wraps a raw row identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row identifier.
    #[must_use]
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EventId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_value() {
        assert_eq!(format!("{}", UserId::new(42)), "42");
        assert_eq!(format!("{}", GuildId::new(7)), "7");
    }

    #[test]
    fn fallback_name_embeds_id() {
        assert_eq!(UserId::new(99).fallback_name(), "User 99");
    }

    #[test]
    fn serde_is_transparent() {
        let Ok(json) = serde_json::to_string(&EventId::new(5)) else {
            panic!("serialization failed");
        };
        assert_eq!(json, "5");
        let Ok(id) = serde_json::from_str::<EventId>("5") else {
            panic!("deserialization failed");
        };
        assert_eq!(id, EventId::new(5));
    }

    #[test]
    fn conversions_round_trip() {
        let user = UserId::from(123_i64);
        assert_eq!(user.get(), 123);
    }
}
