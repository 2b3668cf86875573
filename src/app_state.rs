//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{Closer, Notifier, Registry, Relay};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event creation and registration.
    pub registry: Arc<Registry>,
    /// Owner-gated close and draw operations.
    pub closer: Arc<Closer>,
    /// Anonymous pairing relay.
    pub relay: Arc<Relay>,
    /// Display-name resolution and DM fan-out.
    pub notifier: Arc<Notifier>,
}
