//! Prize contest handlers: create, enter, list, roster, close, draw,
//! winners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::api::dto::{
    CloseRequest, ContestResponse, CreateContestRequest, DrawRequest, DrawResponse,
    EventListResponse, GuildQuery, JoinRequest, RosterResponse, WinnerDto, WinnersResponse,
    parse_snowflake,
};
use crate::app_state::AppState;
use crate::domain::{DrawCount, EventKind, GuildId, UserId};
use crate::error::{BotError, ErrorResponse};

/// `POST /contests` — Create and open a prize contest.
///
/// # Errors
///
/// Returns [`BotError::InvalidRequest`] on a bad name or snowflake and
/// [`BotError::DuplicateName`] when the name is taken in this guild.
#[utoipa::path(
    post,
    path = "/api/v1/contests",
    tag = "Contests",
    summary = "Create a prize contest",
    description = "Creates an open contest owned by the requesting user. Names are unique per guild.",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest created", body = ContestResponse),
        (status = 400, description = "Invalid name or snowflake", body = ErrorResponse),
        (status = 409, description = "Name already taken", body = ErrorResponse),
    )
)]
pub async fn create_contest(
    State(state): State<AppState>,
    Json(req): Json<CreateContestRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let owner = UserId::new(parse_snowflake(&req.owner_id, "owner_id")?);

    let event = state
        .registry
        .open_event(EventKind::Contest, &req.name, guild, owner)
        .await?;

    let reply = format!(
        "The contest {name} has been created and opened. \
         You may join with the command `!contest enter {name}`",
        name = event.name,
    );
    let response = ContestResponse {
        name: event.name,
        guild_id: req.guild_id,
        open: event.open,
        num_winners: event.num_winners,
        created_at: event.created_at,
        reply,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /contests/{name}/entries` — Enter a user into an open contest.
///
/// # Errors
///
/// Returns [`BotError::EventNotFound`], [`BotError::EventClosed`], or
/// [`BotError::AlreadyRegistered`] per contest state.
#[utoipa::path(
    post,
    path = "/api/v1/contests/{name}/entries",
    tag = "Contests",
    summary = "Enter a contest",
    description = "Registers the user as an entrant in an open contest.",
    params(
        ("name" = String, Path, description = "Contest name"),
    ),
    request_body = JoinRequest,
    responses(
        (status = 200, description = "User entered", body = ContestResponse),
        (status = 404, description = "Contest not found", body = ErrorResponse),
        (status = 409, description = "Closed or already entered", body = ErrorResponse),
    )
)]
pub async fn enter_contest(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<JoinRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let user = UserId::new(parse_snowflake(&req.user_id, "user_id")?);

    let event = state
        .registry
        .join(EventKind::Contest, &name, guild, user)
        .await?;
    let username = display_name(&state, guild, user).await;

    let reply = format!("{username} has joined the contest {}!", event.name);
    let response = ContestResponse {
        name: event.name,
        guild_id: req.guild_id,
        open: event.open,
        num_winners: event.num_winners,
        created_at: event.created_at,
        reply,
    };

    Ok(Json(response))
}

/// `GET /contests` — List the guild's open contests.
///
/// # Errors
///
/// Returns [`BotError::InvalidRequest`] on a bad snowflake.
#[utoipa::path(
    get,
    path = "/api/v1/contests",
    tag = "Contests",
    summary = "List open contests",
    description = "Returns the names of every contest in the guild that still accepts entries.",
    params(GuildQuery),
    responses(
        (status = 200, description = "Open contest names", body = EventListResponse),
    )
)]
pub async fn list_contests(
    State(state): State<AppState>,
    Query(query): Query<GuildQuery>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&query.guild_id, "guild_id")?);

    let events = state.registry.list_open(EventKind::Contest, guild).await?;
    let names: Vec<String> = events.into_iter().map(|event| event.name).collect();

    let reply = if names.is_empty() {
        "No contests are open for this server. \
         You may create one with `!contest create <name>`"
            .to_string()
    } else {
        format!("The open contests are:\n\t{}", names.join("\n\t"))
    };

    Ok(Json(EventListResponse { names, reply }))
}

/// `GET /contests/{name}/registrants` — List the contest entrants.
///
/// # Errors
///
/// Returns [`BotError::EventNotFound`] when no such contest exists.
#[utoipa::path(
    get,
    path = "/api/v1/contests/{name}/registrants",
    tag = "Contests",
    summary = "List contest entrants",
    description = "Returns the display names of everyone entered in the contest.",
    params(
        ("name" = String, Path, description = "Contest name"),
        GuildQuery,
    ),
    responses(
        (status = 200, description = "Entrant roster", body = RosterResponse),
        (status = 404, description = "Contest not found", body = ErrorResponse),
    )
)]
pub async fn contest_registrants(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<GuildQuery>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&query.guild_id, "guild_id")?);

    let (event, registrants) = state
        .registry
        .registrants(EventKind::Contest, &name, guild)
        .await?;
    let users: Vec<UserId> = registrants.iter().map(|r| r.user_id).collect();
    let names = state.notifier.roster(guild, &users).await;

    let reply = if names.is_empty() {
        format!("There are no entries for {}", event.name)
    } else {
        format!("The entries for {} are: {}", event.name, names.join(", "))
    };

    Ok(Json(RosterResponse {
        name: event.name,
        registrants: names,
        reply,
    }))
}

/// `POST /contests/{name}/close` — End the contest.
///
/// # Errors
///
/// Returns [`BotError::NotOwner`] or [`BotError::AlreadyClosed`] per
/// contest state.
#[utoipa::path(
    post,
    path = "/api/v1/contests/{name}/close",
    tag = "Contests",
    summary = "Close a contest",
    description = "Owner only. Ends both entry and drawing for the contest.",
    params(
        ("name" = String, Path, description = "Contest name"),
    ),
    request_body = CloseRequest,
    responses(
        (status = 200, description = "Contest closed", body = ContestResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 409, description = "Already closed", body = ErrorResponse),
    )
)]
pub async fn close_contest(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<CloseRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let caller = UserId::new(parse_snowflake(&req.caller_id, "caller_id")?);

    let event = state.closer.close_contest(&name, guild, caller).await?;

    let reply = format!("The contest {} has been closed.", event.name);
    let response = ContestResponse {
        name: event.name,
        guild_id: req.guild_id,
        open: false,
        num_winners: event.num_winners,
        created_at: event.created_at,
        reply,
    };

    Ok(Json(response))
}

/// `POST /contests/{name}/draws` — Draw winners from the entrants.
///
/// # Errors
///
/// Returns [`BotError::InvalidCount`] for a bad count,
/// [`BotError::NotOwner`] or [`BotError::AlreadyClosed`] per contest
/// state.
#[utoipa::path(
    post,
    path = "/api/v1/contests/{name}/draws",
    tag = "Contests",
    summary = "Draw contest winners",
    description = "Owner only. Draws the requested number of winners (or \"all\") from entrants who have not already won, assigning ranks that continue across draws.",
    params(
        ("name" = String, Path, description = "Contest name"),
    ),
    request_body = DrawRequest,
    responses(
        (status = 200, description = "Winners drawn", body = DrawResponse),
        (status = 400, description = "Invalid winner count", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 409, description = "Already closed", body = ErrorResponse),
    )
)]
pub async fn draw_winners(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<DrawRequest>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&req.guild_id, "guild_id")?);
    let caller = UserId::new(parse_snowflake(&req.caller_id, "caller_id")?);
    let count = match req.count.as_deref() {
        Some(raw) => raw.parse::<DrawCount>()?,
        None => DrawCount::Exact(1),
    };

    // ThreadRng is not Send, so seed a fresh StdRng per request.
    let mut rng = StdRng::from_os_rng();
    let report = state
        .closer
        .draw(&name, guild, caller, count, &mut rng)
        .await?;

    let winners = winner_dtos(&state, guild, &report.winners).await;

    let mut reply = String::new();
    if !report.pruned.is_empty() {
        reply.push_str(&format!(
            "Users who have left the server have been removed from the contest: {}\n",
            report.pruned.join(", "),
        ));
    }
    if winners.is_empty() {
        reply.push_str("There is nobody left to draw from.");
    } else {
        reply.push_str(&format!(
            "Congrats to the following winners: \n\t{}",
            winner_lines(&winners).join("\n\t"),
        ));
    }

    Ok(Json(DrawResponse {
        winners,
        pruned: report.pruned,
        total_winners: report.total_winners,
        reply,
    }))
}

/// `GET /contests/{name}/winners` — List all-time winners by rank.
///
/// # Errors
///
/// Returns [`BotError::EventNotFound`] when no such contest exists.
#[utoipa::path(
    get,
    path = "/api/v1/contests/{name}/winners",
    tag = "Contests",
    summary = "List contest winners",
    description = "Returns every winner drawn so far, rank ascending.",
    params(
        ("name" = String, Path, description = "Contest name"),
        GuildQuery,
    ),
    responses(
        (status = 200, description = "All-time winners", body = WinnersResponse),
        (status = 404, description = "Contest not found", body = ErrorResponse),
    )
)]
pub async fn contest_winners(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<GuildQuery>,
) -> Result<impl IntoResponse, BotError> {
    let guild = GuildId::new(parse_snowflake(&query.guild_id, "guild_id")?);

    let (event, winners) = state.closer.winners(&name, guild).await?;
    let ranked: Vec<(i32, UserId)> = winners
        .iter()
        .filter_map(|w| w.win_rank.map(|rank| (rank, w.user_id)))
        .collect();

    let winners = winner_dtos(&state, guild, &ranked).await;
    let reply = if winners.is_empty() {
        format!("The contest {} has no winners", event.name)
    } else {
        format!(
            "Congrats to the following winners: \n\t{}",
            winner_lines(&winners).join("\n\t"),
        )
    };

    Ok(Json(WinnersResponse { winners, reply }))
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

/// Formats one announcement line per winner, `"{rank}. {name}"`.
fn winner_lines(winners: &[WinnerDto]) -> Vec<String> {
    winners
        .iter()
        .map(|w| format!("{}. {}", w.rank, w.display_name))
        .collect()
}

/// Builds winner DTOs with resolved display names, rank order preserved.
async fn winner_dtos(state: &AppState, guild: GuildId, ranked: &[(i32, UserId)]) -> Vec<WinnerDto> {
    let users: Vec<UserId> = ranked.iter().map(|(_, user)| *user).collect();
    let names = state.notifier.roster(guild, &users).await;
    ranked
        .iter()
        .zip(names)
        .map(|((rank, user), display_name)| WinnerDto {
            rank: *rank,
            user_id: user.to_string(),
            display_name,
        })
        .collect()
}

/// Contest routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/contests", post(create_contest).get(list_contests))
        .route("/contests/{name}/entries", post(enter_contest))
        .route("/contests/{name}/registrants", get(contest_registrants))
        .route("/contests/{name}/close", post(close_contest))
        .route("/contests/{name}/draws", post(draw_winners))
        .route("/contests/{name}/winners", get(contest_winners))
}
