//! DTOs and helpers shared across resources.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::BotError;

/// Guild scope for list and status queries.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct GuildQuery {
    /// Guild snowflake id, as a decimal string.
    pub guild_id: String,
}

/// Open event names for a guild, with the rendered chat reply.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Names of the open events, creation order.
    pub names: Vec<String>,
    /// Rendered chat reply text.
    pub reply: String,
}

/// Registrant display names for one event.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    /// Event name.
    pub name: String,
    /// Registrant display names, registration order.
    pub registrants: Vec<String>,
    /// Rendered chat reply text.
    pub reply: String,
}

/// Acknowledgement carrying only the rendered chat reply.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReplyResponse {
    /// Rendered chat reply text.
    pub reply: String,
}

/// Parses a snowflake id sent as a decimal string.
///
/// Chat platforms serialize snowflakes as strings because they exceed
/// the integer range JavaScript handles exactly.
///
/// # Errors
///
/// Returns [`BotError::InvalidRequest`] naming `field` when the value
/// is not a decimal integer.
pub fn parse_snowflake(value: &str, field: &str) -> Result<i64, BotError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| BotError::InvalidRequest(format!("{field} must be a decimal snowflake id")))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn snowflakes_parse_from_decimal_strings() {
        let Ok(id) = parse_snowflake("80351110224678912", "user_id") else {
            panic!("valid snowflake rejected");
        };
        assert_eq!(id, 80_351_110_224_678_912);
    }

    #[test]
    fn non_numeric_snowflakes_name_the_field() {
        let Err(BotError::InvalidRequest(message)) = parse_snowflake("abc", "guild_id") else {
            panic!("invalid snowflake accepted");
        };
        assert!(message.contains("guild_id"));
    }
}
