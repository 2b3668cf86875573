//! Repository interface consumed by the service layer.

use async_trait::async_trait;

use crate::domain::{Event, EventId, EventKind, GuildId, Pairing, Registrant, UserId};
use crate::error::BotError;

/// Relational store holding events, registrants, and pairings.
///
/// The close/draw commit methods are transactional units: the state flip
/// and the result rows succeed or fail together, guarded so that a
/// concurrent duplicate close or draw on the same event loses cleanly
/// (surfaced as [`BotError::AlreadyClosed`]).
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug {
    /// Creates an open event owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::DuplicateName`] when an event of this kind and
    /// name already exists in the guild, [`BotError::Store`] on failure.
    async fn create_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
        owner: UserId,
    ) -> Result<Event, BotError>;

    /// Looks up an event by kind, name, and guild.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn find_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
    ) -> Result<Option<Event>, BotError>;

    /// Lists the open events of one kind within a guild.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn list_open_events(
        &self,
        kind: EventKind,
        guild: GuildId,
    ) -> Result<Vec<Event>, BotError>;

    /// Registers a user for the event.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::AlreadyRegistered`] on a duplicate
    /// registration, [`BotError::Store`] on failure.
    async fn add_registrant(&self, event: &Event, user: UserId) -> Result<(), BotError>;

    /// Returns whether the user is registered for the event.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn is_registered(&self, event: EventId, user: UserId) -> Result<bool, BotError>;

    /// Lists all registrants of the event in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn list_registrants(&self, event: EventId) -> Result<Vec<Registrant>, BotError>;

    /// Lists registrants that have not yet won a draw. This is the
    /// single eligibility predicate for contest draws.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn list_unranked_registrants(&self, event: EventId)
    -> Result<Vec<Registrant>, BotError>;

    /// Removes a registrant (membership pruning).
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn delete_registrant(&self, event: EventId, user: UserId) -> Result<(), BotError>;

    /// Atomically flips the event closed and persists the pairings.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::AlreadyClosed`] when the event was closed by a
    /// concurrent call, [`BotError::Store`] on failure. In both cases no
    /// pairing row is written.
    async fn close_with_pairings(
        &self,
        event: &Event,
        pairings: &[Pairing],
    ) -> Result<(), BotError>;

    /// Flips the event closed with no selection output (contest close).
    ///
    /// # Errors
    ///
    /// Returns [`BotError::AlreadyClosed`] when the event was closed by a
    /// concurrent call, [`BotError::Store`] on failure.
    async fn close_event(&self, event: &Event) -> Result<(), BotError>;

    /// Atomically assigns `win_rank` to each winner and updates the
    /// event's cumulative winner count.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::AlreadyClosed`] when the event was closed by a
    /// concurrent call, [`BotError::Store`] when any winner already holds
    /// a rank (a concurrent draw raced); either way nothing is written.
    async fn commit_draw(
        &self,
        event: &Event,
        winners: &[(i32, UserId)],
        new_total: i32,
    ) -> Result<(), BotError>;

    /// Lists the event's winners ordered by `win_rank` ascending.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn list_winners(&self, event: EventId) -> Result<Vec<Registrant>, BotError>;

    /// Finds every event of this kind and name in which the user is a
    /// registrant, across all guilds. Relay addressing starts from a
    /// direct message, where no guild scope exists.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn find_events_for_registrant(
        &self,
        kind: EventKind,
        name: &str,
        user: UserId,
    ) -> Result<Vec<Event>, BotError>;

    /// Looks up the pairing in which `santa` is the gift giver.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn pairing_for_santa(
        &self,
        event: EventId,
        santa: UserId,
    ) -> Result<Option<Pairing>, BotError>;

    /// Looks up the pairing in which `target` is the recipient.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on failure.
    async fn pairing_for_target(
        &self,
        event: EventId,
        target: UserId,
    ) -> Result<Option<Pairing>, BotError>;
}
