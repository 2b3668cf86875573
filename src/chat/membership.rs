//! Membership directory collaborator interface.

use async_trait::async_trait;

use crate::domain::{GuildId, UserId};
use crate::error::BotError;

/// Oracle answering "is this user still in the guild, and what do we
/// call them".
///
/// The core treats membership as authoritative: a user reported absent
/// is pruned from registrant sets permanently. Display-name resolution
/// never fails; implementations fall back to `"User {id}"`.
#[async_trait]
pub trait Membership: Send + Sync + std::fmt::Debug {
    /// Returns whether the user is currently a member of the guild.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ChatApi`] when the directory cannot be
    /// reached; callers treat that as "unknown" and keep the registrant.
    async fn is_member(&self, guild: GuildId, user: UserId) -> Result<bool, BotError>;

    /// Resolves the user's display name within the guild, falling back
    /// to [`UserId::fallback_name`] when the lookup fails.
    async fn display_name(&self, guild: GuildId, user: UserId) -> String;
}
