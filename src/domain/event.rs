//! Event model: exchanges, contests, registrants, and pairings.
//!
//! An [`Event`] is either a Secret Santa [`EventKind::Exchange`] or a
//! prize-draw [`EventKind::Contest`]. Both share the same registration
//! lifecycle (open at creation, closed exactly once); they differ only in
//! the selection their close/draw step runs.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, GuildId, UserId};
use crate::error::BotError;

/// Discriminator for the two event flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Secret Santa gift exchange: closing draws a cyclic pairing.
    Exchange,
    /// Prize-draw contest: winners are sampled while the contest is open.
    Contest,
}

impl EventKind {
    /// Returns the store discriminator string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exchange => "exchange",
            Self::Contest => "contest",
        }
    }

    /// Returns the user-facing noun for this kind.
    #[must_use]
    pub const fn noun(&self) -> &'static str {
        match self {
            Self::Exchange => "Secret Santa exchange",
            Self::Contest => "contest",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.noun())
    }
}

impl FromStr for EventKind {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exchange" => Ok(Self::Exchange),
            "contest" => Ok(Self::Contest),
            other => Err(BotError::InvalidRequest(format!(
                "unknown event kind: {other}"
            ))),
        }
    }
}

/// An exchange or contest instance scoped to one guild.
///
/// Unique per `(guild_id, kind, name)`. `open` is `true` at creation and
/// flips to `false` exactly once; there is no reopen operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// Event flavor.
    pub kind: EventKind,
    /// Name chosen by the owner, unique within the guild per kind.
    pub name: String,
    /// Guild the event belongs to.
    pub guild_id: GuildId,
    /// User who created the event; only they may close or draw it.
    pub owner_id: UserId,
    /// Whether registration (and, for contests, drawing) is still open.
    pub open: bool,
    /// Cumulative winner count for contests. `None` until the first
    /// draw; always `None` for exchanges.
    pub num_winners: Option<i32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Cumulative winners drawn so far (0 before the first draw).
    #[must_use]
    pub fn winners_so_far(&self) -> i32 {
        self.num_winners.unwrap_or(0)
    }
}

/// A user enrolled in an event.
///
/// `win_rank` is only ever set for contest registrants, exactly once,
/// and never reassigned by later draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    /// Event the registration belongs to.
    pub event_id: EventId,
    /// Registered user.
    pub user_id: UserId,
    /// Rank assigned when the registrant won a draw, `None` otherwise.
    pub win_rank: Option<i32>,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// A santa→target edge produced by exchange matching.
///
/// Written only by the exchange close operation and immutable afterwards.
/// Invariant: `santa_id != target_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// Exchange the pairing belongs to.
    pub event_id: EventId,
    /// The gift giver.
    pub santa_id: UserId,
    /// The recipient the santa gives to.
    pub target_id: UserId,
}

/// Outcome of closing an exchange, for the caller to render.
#[derive(Debug, Clone, Serialize)]
pub struct CloseReport {
    /// Number of pairings drawn and persisted.
    pub pairing_count: usize,
    /// Display names of registrants pruned for having left the guild.
    pub pruned: Vec<String>,
    /// Santas successfully notified by direct message.
    pub notified: usize,
    /// Santas whose direct message could not be delivered.
    pub unreachable: usize,
}

/// Outcome of a contest draw, for the caller to render.
#[derive(Debug, Clone, Serialize)]
pub struct DrawReport {
    /// Winners of this draw as `(rank, user)` in rank order.
    pub winners: Vec<(i32, UserId)>,
    /// Display names of registrants pruned for having left the guild.
    pub pruned: Vec<String>,
    /// Cumulative winner count after this draw.
    pub total_winners: i32,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in [EventKind::Exchange, EventKind::Contest] {
            let Ok(parsed) = kind.as_str().parse::<EventKind>() else {
                panic!("kind failed to parse");
            };
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!("tournament".parse::<EventKind>().is_err());
    }

    #[test]
    fn winners_so_far_defaults_to_zero() {
        let event = Event {
            id: EventId::new(1),
            kind: EventKind::Contest,
            name: "Raffle".to_string(),
            guild_id: GuildId::new(1),
            owner_id: UserId::new(1),
            open: true,
            num_winners: None,
            created_at: Utc::now(),
        };
        assert_eq!(event.winners_so_far(), 0);
    }
}
