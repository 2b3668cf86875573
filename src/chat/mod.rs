//! Chat platform collaborators: membership directory and direct messages.
//!
//! The core never talks to the chat platform directly; it consumes these
//! two small traits. [`rest::RestChatClient`] is the production
//! implementation; tests substitute in-memory stubs.

pub mod membership;
pub mod messenger;
pub mod rest;

pub use membership::Membership;
pub use messenger::Messenger;
pub use rest::RestChatClient;
