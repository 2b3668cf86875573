//! Direct-messaging collaborator interface.

use async_trait::async_trait;

use crate::domain::UserId;
use crate::error::BotError;

/// Delivers a text message to a single user outside any group context.
///
/// Used for pairing notifications and the anonymous relay. Delivery is
/// best-effort: callers isolate a failed send (the user may have
/// disabled direct messages) instead of propagating it.
#[async_trait]
pub trait Messenger: Send + Sync + std::fmt::Debug {
    /// Sends a direct message to the user.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ChatApi`] when the message cannot be
    /// delivered.
    async fn send_dm(&self, user: UserId, text: &str) -> Result<(), BotError>;
}
