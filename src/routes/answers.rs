use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::{
        answer::{MyAnswer, MyStatusRequest, RoomCompletion, SubmitAnswerRequest, SubmitAnswerResponse},
        leaderboard::{GlobalLeaderboardEntry, RoomLeaderboardEntry},
    },
    error::AppError,
    extractors::{Identity, ValidJson},
    services::{answer_service, leaderboard_service},
    state::SharedState,
};

/// Routes of the answer ledger and the leaderboards.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/answers/submit", post(submit_answer))
        .route("/answers/leaderboard/{room_id}", get(room_leaderboard))
        .route("/answers/leaderboard-global", get(global_leaderboard))
        .route("/answers/my/{room_id}", get(my_answers))
        .route("/answers/my-status", post(my_status))
}

/// Score and record an answer. Resubmitting replaces the previous answer to the question.
#[utoipa::path(
    post,
    path = "/answers/submit",
    tag = "answers",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 401, description = "Missing or unknown identity"),
        (status = 404, description = "Question not found in room"),
        (status = 409, description = "Game not started")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    identity: Identity,
    ValidJson(payload): ValidJson<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let outcome = answer_service::submit_answer(&state, identity, payload).await?;
    Ok(Json(outcome))
}

/// Ranked totals of a room.
#[utoipa::path(
    get,
    path = "/answers/leaderboard/{room_id}",
    tag = "answers",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room leaderboard", body = [RoomLeaderboardEntry]),
        (status = 404, description = "Room not found")
    )
)]
pub async fn room_leaderboard(
    State(state): State<SharedState>,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<RoomLeaderboardEntry>>, AppError> {
    let board = leaderboard_service::room_leaderboard(&state, room_id).await?;
    Ok(Json(board))
}

/// Ranked totals across every room.
#[utoipa::path(
    get,
    path = "/answers/leaderboard-global",
    tag = "answers",
    responses((status = 200, description = "Global leaderboard", body = [GlobalLeaderboardEntry]))
)]
pub async fn global_leaderboard(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GlobalLeaderboardEntry>>, AppError> {
    let board = leaderboard_service::global_leaderboard(&state).await?;
    Ok(Json(board))
}

/// The caller's answers in a room.
#[utoipa::path(
    get,
    path = "/answers/my/{room_id}",
    tag = "answers",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses((status = 200, description = "Caller's answers", body = [MyAnswer]))
)]
pub async fn my_answers(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> Result<Json<Vec<MyAnswer>>, AppError> {
    let answers = answer_service::my_answers(&state, identity, room_id).await?;
    Ok(Json(answers))
}

/// Participation and completion of the caller for several rooms.
#[utoipa::path(
    post,
    path = "/answers/my-status",
    tag = "answers",
    request_body = MyStatusRequest,
    responses((status = 200, description = "Per-room completion", body = [RoomCompletion]))
)]
pub async fn my_status(
    State(state): State<SharedState>,
    identity: Identity,
    ValidJson(payload): ValidJson<MyStatusRequest>,
) -> Result<Json<Vec<RoomCompletion>>, AppError> {
    let statuses = answer_service::my_status(&state, identity, payload).await?;
    Ok(Json(statuses))
}
