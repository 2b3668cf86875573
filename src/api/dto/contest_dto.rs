//! Prize contest DTOs: create, enter, close, draw, winners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /contests`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContestRequest {
    /// Contest name, unique per guild.
    pub name: String,
    /// Guild snowflake id.
    pub guild_id: String,
    /// Snowflake id of the creating user, who becomes the owner.
    pub owner_id: String,
}

/// Response body for `POST /contests` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct ContestResponse {
    /// Contest name.
    pub name: String,
    /// Guild snowflake id echoed from the request.
    pub guild_id: String,
    /// Whether the contest still accepts entries and draws.
    pub open: bool,
    /// Cumulative winner count across all draws so far.
    pub num_winners: Option<i32>,
    /// Server creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Rendered chat reply text.
    pub reply: String,
}

/// Request body for `POST /contests/{name}/draws`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DrawRequest {
    /// Guild snowflake id.
    pub guild_id: String,
    /// Snowflake id of the caller; must be the contest owner.
    pub caller_id: String,
    /// Number of winners to draw, or `"all"`. Defaults to 1.
    #[serde(default)]
    pub count: Option<String>,
}

/// One drawn winner.
#[derive(Debug, Serialize, ToSchema)]
pub struct WinnerDto {
    /// Cumulative rank across all draws, 1-based.
    pub rank: i32,
    /// Winner's snowflake id.
    pub user_id: String,
    /// Winner's display name at draw time.
    pub display_name: String,
}

/// Response body for `POST /contests/{name}/draws`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawResponse {
    /// Winners of this draw, rank ascending.
    pub winners: Vec<WinnerDto>,
    /// Display names of entrants pruned for having left the guild.
    pub pruned: Vec<String>,
    /// Cumulative winner count after this draw.
    pub total_winners: i32,
    /// Rendered chat reply text.
    pub reply: String,
}

/// Response body for `GET /contests/{name}/winners`.
#[derive(Debug, Serialize, ToSchema)]
pub struct WinnersResponse {
    /// All-time winners, rank ascending.
    pub winners: Vec<WinnerDto>,
    /// Rendered chat reply text.
    pub reply: String,
}
