//! Event registry: creation, registration, and listing.

use std::sync::Arc;

use crate::domain::{Event, EventKind, GuildId, Registrant, UserId};
use crate::error::BotError;
use crate::persistence::EventStore;

/// Longest accepted event name; matches the store's column width.
pub const MAX_EVENT_NAME_LEN: usize = 64;

/// Registration-side operations shared by exchanges and contests.
#[derive(Debug)]
pub struct Registry {
    store: Arc<dyn EventStore>,
}

impl Registry {
    /// Creates a new `Registry`.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Creates an open event owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::InvalidRequest`] for an empty or oversized
    /// name, [`BotError::DuplicateName`] when the name is taken in this
    /// guild, [`BotError::Store`] on persistence failure.
    pub async fn open_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
        owner: UserId,
    ) -> Result<Event, BotError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BotError::InvalidRequest(format!(
                "you must name your {kind}"
            )));
        }
        if name.len() > MAX_EVENT_NAME_LEN {
            return Err(BotError::InvalidRequest(format!(
                "event names are limited to {MAX_EVENT_NAME_LEN} characters"
            )));
        }

        let event = self.store.create_event(kind, name, guild, owner).await?;
        tracing::info!(event = %event.id, %kind, name, %guild, "event created");
        Ok(event)
    }

    /// Registers `user` for the named open event.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EventNotFound`] when no such event exists,
    /// [`BotError::EventClosed`] when registration has closed,
    /// [`BotError::AlreadyRegistered`] on a repeat registration,
    /// [`BotError::Store`] on persistence failure.
    pub async fn join(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
        user: UserId,
    ) -> Result<Event, BotError> {
        let event = self
            .store
            .find_event(kind, name, guild)
            .await?
            .ok_or_else(|| BotError::EventNotFound {
                kind,
                name: name.to_string(),
            })?;

        if !event.open {
            return Err(BotError::EventClosed {
                kind,
                name: event.name,
            });
        }

        // The store's unique key would catch this too; checking first
        // keeps the duplicate from surfacing as a constraint violation.
        if self.store.is_registered(event.id, user).await? {
            return Err(BotError::AlreadyRegistered { name: event.name });
        }

        self.store.add_registrant(&event, user).await?;
        tracing::info!(event = %event.id, %user, "registrant joined");
        Ok(event)
    }

    /// Lists the open events of one kind within the guild.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Store`] on persistence failure.
    pub async fn list_open(
        &self,
        kind: EventKind,
        guild: GuildId,
    ) -> Result<Vec<Event>, BotError> {
        self.store.list_open_events(kind, guild).await
    }

    /// Returns the named event together with its registrants.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EventNotFound`] when no such event exists,
    /// [`BotError::Store`] on persistence failure.
    pub async fn registrants(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
    ) -> Result<(Event, Vec<Registrant>), BotError> {
        let event = self
            .store
            .find_event(kind, name, guild)
            .await?
            .ok_or_else(|| BotError::EventNotFound {
                kind,
                name: name.to_string(),
            })?;
        let registrants = self.store.list_registrants(event.id).await?;
        Ok((event, registrants))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn registry() -> Registry {
        Registry::new(Arc::new(MemoryStore::new()))
    }

    fn guild() -> GuildId {
        GuildId::new(1)
    }

    #[tokio::test]
    async fn open_event_rejects_empty_name() {
        let registry = registry();
        let result = registry
            .open_event(EventKind::Exchange, "  ", guild(), UserId::new(1))
            .await;
        assert!(matches!(result, Err(BotError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn open_event_rejects_duplicate_name() {
        let registry = registry();
        let first = registry
            .open_event(EventKind::Contest, "Raffle", guild(), UserId::new(1))
            .await;
        assert!(first.is_ok());

        let second = registry
            .open_event(EventKind::Contest, "Raffle", guild(), UserId::new(2))
            .await;
        assert!(matches!(second, Err(BotError::DuplicateName { .. })));
    }

    #[tokio::test]
    async fn join_unknown_event_is_not_found() {
        let registry = registry();
        let result = registry
            .join(EventKind::Exchange, "Winter", guild(), UserId::new(5))
            .await;
        assert!(matches!(result, Err(BotError::EventNotFound { .. })));
    }

    #[tokio::test]
    async fn join_twice_is_rejected() {
        let registry = registry();
        let Ok(_) = registry
            .open_event(EventKind::Exchange, "Winter", guild(), UserId::new(1))
            .await
        else {
            panic!("event creation failed");
        };

        let first = registry
            .join(EventKind::Exchange, "Winter", guild(), UserId::new(5))
            .await;
        assert!(first.is_ok());

        let second = registry
            .join(EventKind::Exchange, "Winter", guild(), UserId::new(5))
            .await;
        assert!(matches!(second, Err(BotError::AlreadyRegistered { .. })));
    }

    #[tokio::test]
    async fn registrants_lists_in_registration_order() {
        let registry = registry();
        let Ok(_) = registry
            .open_event(EventKind::Contest, "Raffle", guild(), UserId::new(1))
            .await
        else {
            panic!("event creation failed");
        };
        for user in [9, 3, 7] {
            let Ok(_) = registry
                .join(EventKind::Contest, "Raffle", guild(), UserId::new(user))
                .await
            else {
                panic!("join failed");
            };
        }

        let Ok((_, registrants)) = registry
            .registrants(EventKind::Contest, "Raffle", guild())
            .await
        else {
            panic!("registrant listing failed");
        };
        let users: Vec<i64> = registrants.iter().map(|r| r.user_id.get()).collect();
        assert_eq!(users, vec![9, 3, 7]);
    }
}
