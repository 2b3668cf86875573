//! Bot error types with HTTP status code mapping.
//!
//! [`BotError`] is the central error type for the bot core. Every variant
//! is recovered at the command boundary and rendered as a structured JSON
//! error response whose `message` is suitable for echoing back to the
//! chat user; none of them crash the process.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::EventKind;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "the contest Raffle was not found",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`BotError`]).
    pub code: u32,
    /// Human-readable, user-presentable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Central error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                  |
/// |-----------|------------------|------------------------------|
/// | 1000–1999 | Validation       | 400 Bad Request              |
/// | 2000–2999 | Lookup/State     | 404 / 409 / 403              |
/// | 3000–3999 | Server           | 500 / 502                    |
/// | 4000–4999 | Selection        | 422 Unprocessable Entity     |
///
/// Only [`BotError::Store`] is considered potentially transient; a caller
/// may safely retry the command after receiving it. Everything else is a
/// deterministic outcome of the current event state.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// Request validation failed (bad snowflake, empty name, etc.).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Requested winner count was not a positive integer or `"all"`.
    #[error("{0} is not a valid number of winners or 'all'")]
    InvalidCount(String),

    /// Anonymous relay invoked outside of a direct-message channel.
    #[error("anonymous messages only work in a direct message to the bot")]
    NotDirectMessage,

    /// No event of this kind and name exists in the guild.
    #[error("the {kind} {name} was not found")]
    EventNotFound {
        /// Kind of the missing event.
        kind: EventKind,
        /// Requested event name.
        name: String,
    },

    /// An event with this name already exists in the guild.
    #[error("the {kind} name {name} has already been taken, please try another")]
    DuplicateName {
        /// Kind of the conflicting event.
        kind: EventKind,
        /// Conflicting event name.
        name: String,
    },

    /// User is already registered for this event.
    #[error("Silly goose, you are already registered for {name}")]
    AlreadyRegistered {
        /// Event the user tried to join twice.
        name: String,
    },

    /// Registration attempted against a closed event.
    #[error("the {kind} {name} is closed, please join the next one")]
    EventClosed {
        /// Kind of the closed event.
        kind: EventKind,
        /// Closed event name.
        name: String,
    },

    /// Close or draw attempted on an event that is already closed.
    #[error("the {kind} {name} is already closed")]
    AlreadyClosed {
        /// Kind of the event.
        kind: EventKind,
        /// Event name.
        name: String,
    },

    /// Caller is not the owner of the event.
    #[error("only the owner of {name} may do that")]
    NotOwner {
        /// Event the caller tried to manage.
        name: String,
    },

    /// Relay sender is not a registrant of any matching exchange.
    #[error("you are not registered in an exchange named {name}")]
    NotRegistered {
        /// Requested exchange name.
        name: String,
    },

    /// No pairing row exists for the relay sender in this exchange.
    #[error("no pairing was found for you in {name}")]
    PairingNotFound {
        /// Exchange name.
        name: String,
    },

    /// Too few eligible registrants to draw pairings.
    #[error("not enough participants to draw pairings: {count} eligible, need at least 2")]
    InsufficientParticipants {
        /// Number of eligible registrants after pruning.
        count: usize,
    },

    /// Persistence layer failure; the enclosing transaction was rolled back.
    #[error("store error: {0}")]
    Store(String),

    /// Chat platform REST API failure (membership lookup or DM delivery).
    #[error("chat platform error: {0}")]
    ChatApi(String),
}

impl BotError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidCount(_) => 1002,
            Self::NotDirectMessage => 1003,
            Self::EventNotFound { .. } => 2001,
            Self::DuplicateName { .. } => 2002,
            Self::AlreadyRegistered { .. } => 2003,
            Self::EventClosed { .. } => 2004,
            Self::AlreadyClosed { .. } => 2005,
            Self::NotOwner { .. } => 2006,
            Self::NotRegistered { .. } => 2007,
            Self::PairingNotFound { .. } => 2008,
            Self::Store(_) => 3001,
            Self::ChatApi(_) => 3002,
            Self::InsufficientParticipants { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidCount(_) | Self::NotDirectMessage => {
                StatusCode::BAD_REQUEST
            }
            Self::EventNotFound { .. } | Self::PairingNotFound { .. } => StatusCode::NOT_FOUND,
            Self::DuplicateName { .. }
            | Self::AlreadyRegistered { .. }
            | Self::EventClosed { .. }
            | Self::AlreadyClosed { .. } => StatusCode::CONFLICT,
            Self::NotOwner { .. } | Self::NotRegistered { .. } => StatusCode::FORBIDDEN,
            Self::InsufficientParticipants { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ChatApi(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = BotError::InvalidCount("zero".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1002);
    }

    #[test]
    fn state_conflicts_map_to_conflict() {
        let err = BotError::AlreadyClosed {
            kind: EventKind::Contest,
            name: "Raffle".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "the contest Raffle is already closed");
    }

    #[test]
    fn not_owner_maps_to_forbidden() {
        let err = BotError::NotOwner {
            name: "Winter".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(err.error_code(), 2006);
    }

    #[test]
    fn insufficient_participants_message_names_count() {
        let err = BotError::InsufficientParticipants { count: 1 };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.to_string().contains("1 eligible"));
    }
}
