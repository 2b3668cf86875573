//! Secret Santa exchange handlers: create, join, list, roster, close.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::api::dto::{
    CloseExchangeResponse, CloseRequest, CreateExchangeRequest, EventListResponse,
    ExchangeResponse, GuildQuery, JoinRequest, RosterResponse, parse_snowflake,
};
use crate::app_state::AppState;
use crate::domain::{EventKind, GuildId, UserId};
use crate::error::{BotError, ErrorResponse};

/// `POST /exchanges` — Create and open a Secret Santa exchange.
///
/// # Errors
///
/// Returns [`BotError::InvalidRequest`] on a bad name or snowflake and
/// [`BotError::DuplicateName`] when the name is taken in this guild.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges",
    tag = "Exchanges",
    summary = "Create a Secret Santa exchange",
    description = "Creates an open exchange owned by the requesting user. Names are unique per guild.",
    request_body = CreateExchangeRequest,
    responses(
        (status = 201, description = "Exchange created", body = ExchangeResponse),
        (status = 400, description = "Invalid name or snowflake", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
    )
)]
pub async fn create_exchange(
    State(state): State<AppState>,
    Json(req): Json<CreateExchangeRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let owner = UserId::new(parse_snowflake(&req.owner_id, "owner_id")?);

    let event = state
        .registry
        .open_event(EventKind::Exchange, &req.name, guild, owner)
        .await?;

    let reply = format!(
        "The Secret Santa exchange {name} has been created and opened. \
         Santas may join with the command \"!santa join {name}\"",
        name = event.name,
    );
    let response = ExchangeResponse {
        name: event.name,
        guild_id: req.guild_id,
        open: event.open,
        created_at: event.created_at,
        reply,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /exchanges/{name}/join` — Register a user for an open exchange.
///
/// # Errors
///
/// Returns [`BotError::EventNotFound`], [`BotError::EventClosed`], or
/// [`BotError::AlreadyRegistered`] per event state.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges/{name}/join",
    tag = "Exchanges",
    summary = "Join an exchange",
    description = "Registers the user as a santa in an open exchange.",
    params(
        ("name" = String, Path, description = "Exchange name"),
    ),
    request_body = JoinRequest,
    responses(
        (status = 200, description = "User registered", body = ExchangeResponse),
        (status = 404, description = "Exchange not found", body = ErrorResponse),
        (status = 409, description = "Closed or already registered", body = ErrorResponse),
    )
)]
pub async fn join_exchange(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let user = UserId::new(parse_snowflake(&req.user_id, "user_id")?);

    let event = state
        .registry
        .join(EventKind::Exchange, &name, guild, user)
        .await?;
    let username = display_name(&state, guild, user).await;

    let reply = format!("{username} has joined the secret santa {}!", event.name);
    let response = ExchangeResponse {
        name: event.name,
        guild_id: req.guild_id,
        open: event.open,
        created_at: event.created_at,
        reply,
    };

    Ok(Json(response))
}

/// `GET /exchanges` — List the guild's open exchanges.
///
/// # Errors
///
/// Returns [`BotError::InvalidRequest`] on a bad snowflake.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges",
    tag = "Exchanges",
    summary = "List open exchanges",
    description = "Returns the names of every exchange in the guild that still accepts registrations.",
    params(GuildQuery),
    responses(
        (status = 200, description = "Open exchange names", body = EventListResponse),
    )
)]
pub async fn list_exchanges(
    State(state): State<AppState>,
    Query(query): Query<GuildQuery>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&query.guild_id, "guild_id")?);

    let events = state.registry.list_open(EventKind::Exchange, guild).await?;
    let names: Vec<String> = events.into_iter().map(|event| event.name).collect();

    let reply = if names.is_empty() {
        "No Secret Santa exchanges are open for this server. \
         You may create one with \"!santa create <name>\""
            .to_string()
    } else {
        format!(
            "The available Secret Santa exchanges are:\n\t{}",
            names.join("\n\t"),
        )
    };

    Ok(Json(EventListResponse { names, reply }))
}

/// `GET /exchanges/{name}/registrants` — List the registered santas.
///
/// # Errors
///
/// Returns [`BotError::EventNotFound`] when no such exchange exists.
#[utoipa::path(
    get,
    path = "/api/v1/exchanges/{name}/registrants",
    tag = "Exchanges",
    summary = "List registered santas",
    description = "Returns the display names of everyone registered in the exchange.",
    params(
        ("name" = String, Path, description = "Exchange name"),
        GuildQuery,
    ),
    responses(
        (status = 200, description = "Registrant roster", body = RosterResponse),
        (status = 404, description = "Exchange not found", body = ErrorResponse),
    )
)]
pub async fn exchange_registrants(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<GuildQuery>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&query.guild_id, "guild_id")?);

    let (event, registrants) = state
        .registry
        .registrants(EventKind::Exchange, &name, guild)
        .await?;
    let users: Vec<UserId> = registrants.iter().map(|r| r.user_id).collect();
    let names = state.notifier.roster(guild, &users).await;

    let reply = if names.is_empty() {
        format!("There are no registered Santas for {}", event.name)
    } else {
        format!(
            "The registered Santas for {} are: {}",
            event.name,
            names.join(", "),
        )
    };

    Ok(Json(RosterResponse {
        name: event.name,
        registrants: names,
        reply,
    }))
}

/// `POST /exchanges/{name}/close` — Close the exchange and draw pairings.
///
/// # Errors
///
/// Returns [`BotError::NotOwner`], [`BotError::AlreadyClosed`], or
/// [`BotError::InsufficientParticipants`] per event state.
#[utoipa::path(
    post,
    path = "/api/v1/exchanges/{name}/close",
    tag = "Exchanges",
    summary = "Close an exchange and draw pairings",
    description = "Owner only. Prunes registrants who left the guild, assigns every remaining santa a giftee, and notifies each santa by direct message.",
    params(
        ("name" = String, Path, description = "Exchange name"),
    ),
    request_body = CloseRequest,
    responses(
        (status = 200, description = "Pairings drawn and santas notified", body = CloseExchangeResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 409, description = "Already closed", body = ErrorResponse),
        (status = 422, description = "Fewer than two eligible santas", body = ErrorResponse),
    )
)]
pub async fn close_exchange(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<CloseRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let caller = UserId::new(parse_snowflake(&req.caller_id, "caller_id")?);

    // ThreadRng is not Send, so seed a fresh StdRng per request.
    let mut rng = StdRng::from_os_rng();
    let report = state
        .closer
        .close_exchange(&name, guild, caller, &mut rng)
        .await?;

    let mut reply = format!(
        "The Secret Santa exchange {name} has been closed. \
         {count} santas have been told who they are gifting by direct message.",
        count = report.notified,
    );
    if !report.pruned.is_empty() {
        reply.push_str(&format!(
            " Users who have left the server have been removed from the exchange: {}",
            report.pruned.join(", "),
        ));
    }
    if report.unreachable > 0 {
        reply.push_str(&format!(
            " {} santas could not be reached by direct message.",
            report.unreachable,
        ));
    }

    Ok(Json(CloseExchangeResponse {
        pairing_count: report.pairing_count,
        pruned: report.pruned,
        notified: report.notified,
        unreachable: report.unreachable,
        reply,
    }))
}

/// Resolves one display name through the roster lookup.
async fn display_name(state: &AppState, guild: GuildId, user: UserId) -> String {
    state
        .notifier
        .roster(guild, std::slice::from_ref(&user))
        .await
        .into_iter()
        .next()
        .unwrap_or_else(|| user.fallback_name())
}

/// Exchange routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/exchanges", post(create_exchange).get(list_exchanges))
        .route("/exchanges/{name}/join", post(join_exchange))
        .route("/exchanges/{name}/registrants", get(exchange_registrants))
        .route("/exchanges/{name}/close", post(close_exchange))
}
