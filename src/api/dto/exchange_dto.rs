//! Secret Santa exchange DTOs: create, join, close, relay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /exchanges`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateExchangeRequest {
    /// Exchange name, unique per guild.
    pub name: String,
    /// Guild snowflake id.
    pub guild_id: String,
    /// Snowflake id of the creating user, who becomes the owner.
    pub owner_id: String,
}

/// Response body for `POST /exchanges` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct ExchangeResponse {
    /// Exchange name.
    pub name: String,
    /// Guild snowflake id echoed from the request.
    pub guild_id: String,
    /// Whether the exchange still accepts registrations.
    pub open: bool,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Rendered chat reply text.
    pub reply: String,
}

/// Request body for `POST /exchanges/{name}/join`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinRequest {
    /// Guild snowflake id.
    pub guild_id: String,
    /// Snowflake id of the joining user.
    pub user_id: String,
}

/// Request body for `POST /exchanges/{name}/close`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CloseRequest {
    /// Guild snowflake id.
    pub guild_id: String,
    /// Snowflake id of the caller; must be the event owner.
    pub caller_id: String,
}

/// Response body for `POST /exchanges/{name}/close`.
#[derive(Debug, Serialize, ToSchema)]
pub struct CloseExchangeResponse {
    /// Number of santa-to-target pairings drawn.
    pub pairing_count: usize,
    /// Display names of registrants pruned for having left the guild.
    pub pruned: Vec<String>,
    /// Santas successfully notified by DM.
    pub notified: usize,
    /// Santas whose DM could not be delivered.
    pub unreachable: usize,
    /// Rendered chat reply text.
    pub reply: String,
}

/// Request body for `POST /exchanges/{name}/messages`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RelayRequest {
    /// Snowflake id of the sending user.
    pub sender_id: String,
    /// `"to-target"` or `"to-santa"`.
    pub direction: String,
    /// Message text to forward anonymously.
    pub text: String,
    /// Whether the command arrived in a direct message to the bot.
    pub direct: bool,
}
