use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};

use crate::{
    dto::{
        game::GameStatePayload,
        room::{
            AddQuestionRequest, CreateRoomRequest, MembershipResponse, QuestionSummary,
            RoomStanding, RoomSummary, ScheduleRoomRequest, SelfPacedQuestion,
            UpdateProfileRequest, UserProfile,
        },
    },
    error::AppError,
    extractors::{Identity, ValidJson},
    services::{broadcast_service, leaderboard_service, room_service},
    state::SharedState,
};

/// Routes managing profiles, rooms, questions and membership.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/users/me", put(update_profile))
        .route("/rooms", post(create_room))
        .route("/rooms/{room_id}/game", get(game_state))
        .route("/rooms/{room_id}/standing", get(room_standing))
        .route("/rooms/{room_id}/questions", post(add_question))
        .route("/rooms/{room_id}/questions/{index}", get(self_paced_question))
        .route("/rooms/{room_id}/schedule", post(schedule_room))
        .route("/rooms/{room_id}/publish", post(publish_room))
        .route("/rooms/{room_id}/join", post(join_room))
        .route("/rooms/{room_id}/leave", post(leave_room))
}

/// Create or rename the caller's profile.
#[utoipa::path(
    put,
    path = "/users/me",
    tag = "rooms",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile saved", body = UserProfile),
        (status = 400, description = "Invalid or taken username")
    )
)]
pub async fn update_profile(
    State(state): State<SharedState>,
    identity: Identity,
    ValidJson(payload): ValidJson<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = room_service::upsert_profile(&state, identity, payload).await?;
    Ok(Json(profile))
}

/// Create a room owned by the calling host.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 200, description = "Room created", body = RoomSummary),
        (status = 403, description = "Caller is not a host")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    identity: Identity,
    ValidJson(payload): ValidJson<CreateRoomRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    let room = room_service::create_room(&state, identity, payload).await?;
    Ok(Json(room))
}

/// Current game state of a room, as pushed by the broadcast loop.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/game",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Game state", body = GameStatePayload),
        (status = 404, description = "Room not found")
    )
)]
pub async fn game_state(
    State(state): State<SharedState>,
    Path(room_id): Path<i64>,
) -> Result<Json<GameStatePayload>, AppError> {
    let payload = broadcast_service::current_game_state(&state, room_id).await?;
    Ok(Json(payload))
}

/// The caller's progress, cached score and position in a room.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/standing",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses((status = 200, description = "Caller's standing", body = RoomStanding))
)]
pub async fn room_standing(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomStanding>, AppError> {
    let standing = leaderboard_service::room_standing(&state, identity, room_id).await?;
    Ok(Json(standing))
}

/// Append a question to a room owned by the caller.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/questions",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    request_body = AddQuestionRequest,
    responses(
        (status = 200, description = "Question added", body = QuestionSummary),
        (status = 403, description = "Room belongs to another host")
    )
)]
pub async fn add_question(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
    ValidJson(payload): ValidJson<AddQuestionRequest>,
) -> Result<Json<QuestionSummary>, AppError> {
    let question = room_service::add_question(&state, identity, room_id, payload).await?;
    Ok(Json(question))
}

/// Fetch a question of a self-paced room. `elapsedMs` is measured from this response.
#[utoipa::path(
    get,
    path = "/rooms/{room_id}/questions/{index}",
    tag = "rooms",
    params(
        ("room_id" = i64, Path, description = "Room identifier"),
        ("index" = usize, Path, description = "Zero-based question index")
    ),
    responses(
        (status = 200, description = "Question served", body = SelfPacedQuestion),
        (status = 404, description = "No question at this index"),
        (status = 409, description = "Room follows the game clock")
    )
)]
pub async fn self_paced_question(
    State(state): State<SharedState>,
    identity: Identity,
    Path((room_id, index)): Path<(i64, usize)>,
) -> Result<Json<SelfPacedQuestion>, AppError> {
    let question = room_service::self_paced_question(&state, identity, room_id, index).await?;
    Ok(Json(question))
}

/// Set or clear the start time of a room owned by the caller.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/schedule",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    request_body = ScheduleRoomRequest,
    responses((status = 200, description = "Schedule updated", body = RoomSummary))
)]
pub async fn schedule_room(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
    ValidJson(payload): ValidJson<ScheduleRoomRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    let room = room_service::schedule_room(&state, identity, room_id, payload).await?;
    Ok(Json(room))
}

/// List a room owned by the caller in the room feed.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/publish",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses(
        (status = 200, description = "Room published", body = RoomSummary),
        (status = 400, description = "Room has no questions")
    )
)]
pub async fn publish_room(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> Result<Json<RoomSummary>, AppError> {
    let room = room_service::publish_room(&state, identity, room_id).await?;
    Ok(Json(room))
}

/// Join a room as a participant.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/join",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses((status = 200, description = "Membership updated", body = MembershipResponse))
)]
pub async fn join_room(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> Result<Json<MembershipResponse>, AppError> {
    let membership = room_service::join_room(&state, identity, room_id).await?;
    Ok(Json(membership))
}

/// Leave a room.
#[utoipa::path(
    post,
    path = "/rooms/{room_id}/leave",
    tag = "rooms",
    params(("room_id" = i64, Path, description = "Room identifier")),
    responses((status = 200, description = "Membership updated", body = MembershipResponse))
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    identity: Identity,
    Path(room_id): Path<i64>,
) -> Result<Json<MembershipResponse>, AppError> {
    let membership = room_service::leave_room(&state, identity, room_id).await?;
    Ok(Json(membership))
}
