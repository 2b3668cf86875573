//! Event lifecycle services built on top of the store and chat traits.

mod closer;
mod notifier;
mod registry;
mod relay;

pub use closer::Closer;
pub use notifier::{Notifier, NotifyOutcome};
pub use registry::{MAX_EVENT_NAME_LEN, Registry};
pub use relay::{Relay, RelayDirection};
