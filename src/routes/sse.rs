use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;

use crate::{
    error::AppError,
    services::{broadcast_service, push_events, sse_service},
    state::{SharedState, Topic},
};

#[utoipa::path(
    get,
    path = "/sse/rooms",
    tag = "sse",
    responses((status = 200, description = "Room feed snapshots", content_type = "text/event-stream", body = String))
)]
/// Stream room feed snapshots.
pub async fn rooms_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state, Topic::RoomsFeed);
    sse_service::to_sse_stream(receiver, Topic::RoomsFeed, Vec::new())
}

#[utoipa::path(
    get,
    path = "/sse/leaderboard",
    tag = "sse",
    responses((status = 200, description = "Global leaderboard snapshots", content_type = "text/event-stream", body = String))
)]
/// Stream global leaderboard snapshots.
pub async fn leaderboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state, Topic::GlobalLeaderboard);
    sse_service::to_sse_stream(receiver, Topic::GlobalLeaderboard, Vec::new())
}

#[utoipa::path(
    get,
    path = "/sse/rooms/{room_id}/game",
    tag = "sse",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Game state of the room, starting with the current one", content_type = "text/event-stream", body = String),
        (status = 404, description = "Room not found")
    )
)]
/// Stream the game state of a room, starting with its current state.
pub async fn game_stream(
    State(state): State<SharedState>,
    Path(room_id): Path<i64>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let topic = Topic::Game(room_id);
    let receiver = sse_service::subscribe(&state, topic);
    let current = broadcast_service::current_game_state(&state, room_id).await?;
    let initial = push_events::game_state_event(&current).into_iter().collect();
    Ok(sse_service::to_sse_stream(receiver, topic, initial))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/rooms", get(rooms_stream))
        .route("/sse/leaderboard", get(leaderboard_stream))
        .route("/sse/rooms/{room_id}/game", get(game_stream))
}
