//! Anonymous relay handler.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{RelayRequest, ReplyResponse, parse_snowflake};
use crate::app_state::AppState;
use crate::domain::UserId;
use crate::error::{BotError, ErrorResponse};
use crate::service::RelayDirection;

/// `POST /exchanges/{name}/messages` — Forward an anonymous message.
///
/// # Errors
///
/// Returns [`BotError::NotDirectMessage`], [`BotError::NotRegistered`],
/// or [`BotError::PairingNotFound`] per sender state.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges/{name}/messages",
    tag = "Exchanges",
    summary = "Relay an anonymous message",
    description = "Forwards a message between pairing partners without revealing the sender. Only works from a direct message, and only after the exchange has been drawn.",
    params(
        ("name" = String, Path, description = "Exchange name"),
    ),
    request_body = RelayRequest,
    responses(
        (status = 200, description = "Message delivered", body = ReplyResponse),
        (status = 400, description = "Not a direct message or bad direction", body = ErrorResponse),
        (status = 403, description = "Sender not registered", body = ErrorResponse),
        (status = 404, description = "No pairing for the sender", body = ErrorResponse),
        (status = 502, description = "Delivery failed", body = ErrorResponse),
    )
)]
pub async fn relay_message(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<RelayRequest>,
) -> Result<impl IntoResponse, BotError> {
    let sender = UserId::new(parse_snowflake(&req.sender_id, "sender_id")?);
    let direction: RelayDirection = req.direction.parse()?;

    state
        .relay
        .forward(&name, sender, direction, &req.text, req.direct)
        .await?;

    Ok(Json(ReplyResponse {
        reply: "Your message has been delivered.".to_string(),
    }))
}

/// Relay routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/exchanges/{name}/messages", post(relay_message))
}
