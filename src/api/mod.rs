//! HTTP surface of the bot: request/response DTOs, handlers, and the
//! assembled router.
//!
//! Exchange, contest, and relay routes live under `/api/v1`; the health
//! probe stays at the root.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Assembles the versioned event routes plus the root-level health probe.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}
