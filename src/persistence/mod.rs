//! Persistence layer: the event store interface and its backends.
//!
//! [`EventStore`] is the repository-style interface the service layer
//! consumes. [`postgres::PostgresStore`] is the production backend;
//! [`memory::MemoryStore`] backs tests and database-less local runs.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::EventStore;
