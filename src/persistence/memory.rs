//! In-memory event store.
//!
//! Implements [`EventStore`] semantics, including the open/unranked
//! commit guards, behind a single `tokio::sync::RwLock`. Used by the
//! service tests and for running the bot locally without a database.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::EventStore;
use crate::domain::{Event, EventId, EventKind, GuildId, Pairing, Registrant, UserId};
use crate::error::BotError;

#[derive(Debug, Default)]
struct Inner {
    next_event_id: i64,
    events: Vec<Event>,
    registrants: Vec<Registrant>,
    pairings: Vec<Pairing>,
}

/// In-memory [`EventStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
        owner: UserId,
    ) -> Result<Event, BotError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .events
            .iter()
            .any(|e| e.kind == kind && e.guild_id == guild && e.name == name);
        if duplicate {
            return Err(BotError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }

        inner.next_event_id += 1;
        let event = Event {
            id: EventId::new(inner.next_event_id),
            kind,
            name: name.to_string(),
            guild_id: guild,
            owner_id: owner,
            open: true,
            num_winners: None,
            created_at: Utc::now(),
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn find_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
    ) -> Result<Option<Event>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .find(|e| e.kind == kind && e.guild_id == guild && e.name == name)
            .cloned())
    }

    async fn list_open_events(
        &self,
        kind: EventKind,
        guild: GuildId,
    ) -> Result<Vec<Event>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| e.kind == kind && e.guild_id == guild && e.open)
            .cloned()
            .collect())
    }

    async fn add_registrant(&self, event: &Event, user: UserId) -> Result<(), BotError> {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .registrants
            .iter()
            .any(|r| r.event_id == event.id && r.user_id == user);
        if duplicate {
            return Err(BotError::AlreadyRegistered {
                name: event.name.clone(),
            });
        }
        inner.registrants.push(Registrant {
            event_id: event.id,
            user_id: user,
            win_rank: None,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn is_registered(&self, event: EventId, user: UserId) -> Result<bool, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrants
            .iter()
            .any(|r| r.event_id == event && r.user_id == user))
    }

    async fn list_registrants(&self, event: EventId) -> Result<Vec<Registrant>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrants
            .iter()
            .filter(|r| r.event_id == event)
            .copied()
            .collect())
    }

    async fn list_unranked_registrants(
        &self,
        event: EventId,
    ) -> Result<Vec<Registrant>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .registrants
            .iter()
            .filter(|r| r.event_id == event && r.win_rank.is_none())
            .copied()
            .collect())
    }

    async fn delete_registrant(&self, event: EventId, user: UserId) -> Result<(), BotError> {
        let mut inner = self.inner.write().await;
        inner
            .registrants
            .retain(|r| !(r.event_id == event && r.user_id == user));
        Ok(())
    }

    async fn close_with_pairings(
        &self,
        event: &Event,
        pairings: &[Pairing],
    ) -> Result<(), BotError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| BotError::Store(format!("event {} vanished", event.id)))?;
        if !stored.open {
            return Err(BotError::AlreadyClosed {
                kind: event.kind,
                name: event.name.clone(),
            });
        }
        stored.open = false;
        inner.pairings.extend_from_slice(pairings);
        Ok(())
    }

    async fn close_event(&self, event: &Event) -> Result<(), BotError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .events
            .iter_mut()
            .find(|e| e.id == event.id)
            .ok_or_else(|| BotError::Store(format!("event {} vanished", event.id)))?;
        if !stored.open {
            return Err(BotError::AlreadyClosed {
                kind: event.kind,
                name: event.name.clone(),
            });
        }
        stored.open = false;
        Ok(())
    }

    async fn commit_draw(
        &self,
        event: &Event,
        winners: &[(i32, UserId)],
        new_total: i32,
    ) -> Result<(), BotError> {
        let mut inner = self.inner.write().await;

        let open = inner
            .events
            .iter()
            .find(|e| e.id == event.id)
            .is_some_and(|e| e.open);
        if !open {
            return Err(BotError::AlreadyClosed {
                kind: event.kind,
                name: event.name.clone(),
            });
        }

        // Validate every winner before mutating anything, mirroring the
        // all-or-nothing transaction of the SQL store.
        for (_, user) in winners {
            let unranked = inner
                .registrants
                .iter()
                .any(|r| r.event_id == event.id && r.user_id == *user && r.win_rank.is_none());
            if !unranked {
                return Err(BotError::Store(format!(
                    "draw raced on registrant {user} of {}",
                    event.name
                )));
            }
        }

        for (rank, user) in winners {
            if let Some(registrant) = inner
                .registrants
                .iter_mut()
                .find(|r| r.event_id == event.id && r.user_id == *user)
            {
                registrant.win_rank = Some(*rank);
            }
        }
        if let Some(stored) = inner.events.iter_mut().find(|e| e.id == event.id) {
            stored.num_winners = Some(new_total);
        }
        Ok(())
    }

    async fn list_winners(&self, event: EventId) -> Result<Vec<Registrant>, BotError> {
        let inner = self.inner.read().await;
        let mut winners: Vec<Registrant> = inner
            .registrants
            .iter()
            .filter(|r| r.event_id == event && r.win_rank.is_some())
            .copied()
            .collect();
        winners.sort_by_key(|r| r.win_rank);
        Ok(winners)
    }

    async fn find_events_for_registrant(
        &self,
        kind: EventKind,
        name: &str,
        user: UserId,
    ) -> Result<Vec<Event>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .events
            .iter()
            .filter(|e| {
                e.kind == kind
                    && e.name == name
                    && inner
                        .registrants
                        .iter()
                        .any(|r| r.event_id == e.id && r.user_id == user)
            })
            .cloned()
            .collect())
    }

    async fn pairing_for_santa(
        &self,
        event: EventId,
        santa: UserId,
    ) -> Result<Option<Pairing>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .pairings
            .iter()
            .find(|p| p.event_id == event && p.santa_id == santa)
            .copied())
    }

    async fn pairing_for_target(
        &self,
        event: EventId,
        target: UserId,
    ) -> Result<Option<Pairing>, BotError> {
        let inner = self.inner.read().await;
        Ok(inner
            .pairings
            .iter()
            .find(|p| p.event_id == event && p.target_id == target)
            .copied())
    }
}
