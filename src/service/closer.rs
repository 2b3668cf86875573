//! Close/draw state machine shared by exchanges and contests.
//!
//! Both event kinds run the same guarded transition: look the event up,
//! check ownership, check it is still open, prune registrants who left
//! the guild, then run the kind's selection and commit it atomically
//! through the store. Exchanges additionally fan out pairing
//! notifications after the commit.

use std::sync::Arc;

use rand::Rng;

use super::Notifier;
use crate::chat::Membership;
use crate::domain::{
    CloseReport, DrawCount, DrawReport, Event, EventKind, GuildId, Pairing, Registrant, UserId,
    cyclic_pairing, draw_winners,
};
use crate::error::BotError;
use crate::persistence::EventStore;

/// Owner-gated close and draw operations.
#[derive(Debug)]
pub struct Closer {
    store: Arc<dyn EventStore>,
    membership: Arc<dyn Membership>,
    notifier: Arc<Notifier>,
}

impl Closer {
    /// Creates a new `Closer`.
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        membership: Arc<dyn Membership>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            store,
            membership,
            notifier,
        }
    }

    /// Closes an exchange: prunes absentees, draws the cyclic pairing,
    /// persists it atomically with the state flip, and notifies santas.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EventNotFound`], [`BotError::NotOwner`], or
    /// [`BotError::AlreadyClosed`] when the preconditions fail (checked
    /// in that order), [`BotError::InsufficientParticipants`] when fewer
    /// than two registrants remain after pruning (the exchange stays
    /// open), [`BotError::Store`] on persistence failure.
    pub async fn close_exchange<R: Rng + Send>(
        &self,
        name: &str,
        guild: GuildId,
        caller: UserId,
        rng: &mut R,
    ) -> Result<CloseReport, BotError> {
        let event = self
            .guarded_event(EventKind::Exchange, name, guild, caller)
            .await?;
        let registrants = self.store.list_registrants(event.id).await?;
        let (eligible, pruned) = self.prune_absent(&event, registrants).await;

        let edges = cyclic_pairing(rng, &eligible)?;
        let pairings: Vec<Pairing> = edges
            .into_iter()
            .map(|(santa_id, target_id)| Pairing {
                event_id: event.id,
                santa_id,
                target_id,
            })
            .collect();

        self.store.close_with_pairings(&event, &pairings).await?;
        tracing::info!(
            event = %event.id,
            name = %event.name,
            pairings = pairings.len(),
            pruned = pruned.len(),
            "exchange closed"
        );

        let outcome = self
            .notifier
            .notify_pairings(event.guild_id, &event.name, &pairings)
            .await;

        Ok(CloseReport {
            pairing_count: pairings.len(),
            pruned,
            notified: outcome.notified,
            unreachable: outcome.unreachable,
        })
    }

    /// Closes a contest, ending both registration and drawing.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EventNotFound`], [`BotError::NotOwner`], or
    /// [`BotError::AlreadyClosed`] when the preconditions fail,
    /// [`BotError::Store`] on persistence failure.
    pub async fn close_contest(
        &self,
        name: &str,
        guild: GuildId,
        caller: UserId,
    ) -> Result<Event, BotError> {
        let event = self
            .guarded_event(EventKind::Contest, name, guild, caller)
            .await?;
        self.store.close_event(&event).await?;
        tracing::info!(event = %event.id, name = %event.name, "contest closed");
        Ok(event)
    }

    /// Draws contest winners: prunes absentees, samples the requested
    /// count from the not-yet-ranked registrants, and assigns cumulative
    /// ranks atomically.
    ///
    /// Winners of earlier draws are never redrawn. Zero eligible
    /// registrants yields an empty report with the cumulative count
    /// unchanged, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EventNotFound`], [`BotError::NotOwner`], or
    /// [`BotError::AlreadyClosed`] when the preconditions fail,
    /// [`BotError::Store`] on persistence failure.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub async fn draw<R: Rng + Send>(
        &self,
        name: &str,
        guild: GuildId,
        caller: UserId,
        count: DrawCount,
        rng: &mut R,
    ) -> Result<DrawReport, BotError> {
        let event = self
            .guarded_event(EventKind::Contest, name, guild, caller)
            .await?;
        let unranked = self.store.list_unranked_registrants(event.id).await?;
        let (eligible, pruned) = self.prune_absent(&event, unranked).await;

        let prev = event.winners_so_far();
        let winners = draw_winners(rng, &eligible, count, prev);
        if winners.is_empty() {
            return Ok(DrawReport {
                winners,
                pruned,
                total_winners: prev,
            });
        }

        let total = prev + winners.len() as i32;
        self.store.commit_draw(&event, &winners, total).await?;
        tracing::info!(
            event = %event.id,
            name = %event.name,
            drawn = winners.len(),
            total_winners = total,
            "contest winners drawn"
        );

        Ok(DrawReport {
            winners,
            pruned,
            total_winners: total,
        })
    }

    /// Returns the contest together with its all-time winners ordered by
    /// rank. A status query: no ownership or open check.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::EventNotFound`] when no such contest exists,
    /// [`BotError::Store`] on persistence failure.
    pub async fn winners(
        &self,
        name: &str,
        guild: GuildId,
    ) -> Result<(Event, Vec<Registrant>), BotError> {
        let event = self
            .store
            .find_event(EventKind::Contest, name, guild)
            .await?
            .ok_or_else(|| BotError::EventNotFound {
                kind: EventKind::Contest,
                name: name.to_string(),
            })?;
        let winners = self.store.list_winners(event.id).await?;
        Ok((event, winners))
    }

    /// Checks the close/draw preconditions in their reporting order:
    /// existence, ownership, openness.
    async fn guarded_event(
        &self,
        kind: EventKind,
        name: &str,
        guild: GuildId,
        caller: UserId,
    ) -> Result<Event, BotError> {
        let event = self
            .store
            .find_event(kind, name, guild)
            .await?
            .ok_or_else(|| BotError::EventNotFound {
                kind,
                name: name.to_string(),
            })?;

        if event.owner_id != caller {
            return Err(BotError::NotOwner { name: event.name });
        }
        if !event.open {
            return Err(BotError::AlreadyClosed {
                kind,
                name: event.name,
            });
        }
        Ok(event)
    }

    /// Filters the registrants down to current guild members, deleting
    /// absentees from the store. Returns the eligible user ids and the
    /// display names of everyone pruned.
    ///
    /// Best-effort per registrant: an unreachable membership directory
    /// keeps the registrant, and a failed delete still excludes them
    /// from this selection.
    async fn prune_absent(
        &self,
        event: &Event,
        registrants: Vec<Registrant>,
    ) -> (Vec<UserId>, Vec<String>) {
        let mut eligible = Vec::with_capacity(registrants.len());
        let mut pruned = Vec::new();

        for registrant in registrants {
            let user = registrant.user_id;
            match self.membership.is_member(event.guild_id, user).await {
                Ok(true) => eligible.push(user),
                Ok(false) => {
                    let name = self.membership.display_name(event.guild_id, user).await;
                    if let Err(err) = self.store.delete_registrant(event.id, user).await {
                        tracing::warn!(%err, %user, event = %event.id, "pruning delete failed");
                    }
                    tracing::info!(%user, event = %event.id, "pruned absent registrant");
                    pruned.push(name);
                }
                Err(err) => {
                    tracing::warn!(%err, %user, event = %event.id, "membership lookup failed, keeping registrant");
                    eligible.push(user);
                }
            }
        }

        (eligible, pruned)
    }
}
