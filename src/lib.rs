//! # mistletoe
//!
//! Gift-exchange and prize-draw service for chat guilds.
//!
//! This crate runs the event lifecycle behind a Secret Santa bot: users
//! create named exchanges or contests inside a guild, others register,
//! and the owner later closes the exchange (drawing a single cycle of
//! santa-to-target pairings) or draws contest winners with cumulative
//! ranks. Santas and their giftees can keep talking through an
//! anonymous relay.
//!
//! ## Architecture
//!
//! ```text
//! Chat platform webhooks (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── Registry / Closer / Relay / Notifier (service/)
//!     ├── Selection algorithms (domain/selector)
//!     │
//!     ├── EventStore (persistence/: PostgreSQL or in-memory)
//!     └── Membership + Messenger (chat/: platform REST client)
//! ```

pub mod api;
pub mod app_state;
pub mod chat;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
