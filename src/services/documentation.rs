use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Ritual Quiz Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::answers::submit_answer,
        crate::routes::answers::room_leaderboard,
        crate::routes::answers::global_leaderboard,
        crate::routes::answers::my_answers,
        crate::routes::answers::my_status,
        crate::routes::rooms::update_profile,
        crate::routes::rooms::create_room,
        crate::routes::rooms::game_state,
        crate::routes::rooms::room_standing,
        crate::routes::rooms::add_question,
        crate::routes::rooms::self_paced_question,
        crate::routes::rooms::schedule_room,
        crate::routes::rooms::publish_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::leave_room,
        crate::routes::sse::rooms_stream,
        crate::routes::sse::leaderboard_stream,
        crate::routes::sse::game_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::answer::SubmitAnswerRequest,
            crate::dto::answer::SubmitAnswerResponse,
            crate::dto::answer::MyAnswer,
            crate::dto::answer::MyStatusRequest,
            crate::dto::answer::RoomCompletion,
            crate::dto::leaderboard::RoomLeaderboardEntry,
            crate::dto::leaderboard::GlobalLeaderboardEntry,
            crate::dto::game::GameStatePayload,
            crate::dto::game::ActiveGameState,
            crate::dto::game::FinishedGameState,
            crate::dto::game::NotStartedGameState,
            crate::dto::game::QuestionView,
            crate::dto::game::RoomFeedItem,
            crate::dto::game::RoomStatusDto,
            crate::dto::room::UpdateProfileRequest,
            crate::dto::room::UserProfile,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::ScheduleRoomRequest,
            crate::dto::room::RoomSummary,
            crate::dto::room::AddQuestionRequest,
            crate::dto::room::QuestionSummary,
            crate::dto::room::MembershipResponse,
            crate::dto::room::RoomStanding,
            crate::dto::room::SelfPacedQuestion,
            crate::dto::sse::RoomsSnapshotEvent,
            crate::dto::sse::GlobalLeaderboardSnapshotEvent,
            crate::dto::ws::ViewerInboundMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "answers", description = "Answer ledger and leaderboards"),
        (name = "rooms", description = "Profiles, rooms, questions and membership"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "viewers", description = "WebSocket push for game viewers"),
    )
)]
pub struct ApiDoc;
