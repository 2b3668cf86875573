//! Domain layer: identifiers, the event model, and selection algorithms.
//!
//! This module is the algorithmic core of the bot: the cyclic-derangement
//! exchange matcher and the cumulative-rank contest draw, plus the types
//! they operate over. Everything here is synchronous and store-agnostic.

pub mod event;
pub mod ids;
pub mod selector;

pub use event::{CloseReport, DrawReport, Event, EventKind, Pairing, Registrant};
pub use ids::{EventId, GuildId, UserId};
pub use selector::{DrawCount, cyclic_pairing, draw_winners};
