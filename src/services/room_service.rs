//! Room management used to seed and drive quizzes: profiles, rooms, questions and membership.

use std::time::SystemTime;

use tracing::info;

use crate::{
    dao::{
        models::{NewQuestionEntity, NewRoomEntity, RoomEntity, UserEntity},
        quiz_store::QuizStore,
    },
    dto::{
        format_system_time,
        room::{
            AddQuestionRequest, CreateRoomRequest, MembershipResponse, QuestionSummary,
            RoomSummary, ScheduleRoomRequest, SelfPacedQuestion, UpdateProfileRequest,
            UserProfile,
        },
    },
    error::ServiceError,
    extractors::Identity,
    state::{SharedState, quiz::Room},
};

/// Resolve the profile of `user_id`, failing with Unauthorized for unknown identities.
pub async fn require_known_user(
    store: &dyn QuizStore,
    user_id: i64,
) -> Result<UserEntity, ServiceError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| ServiceError::Unauthorized(format!("unknown user {user_id}")))
}

/// Load a room or fail with NotFound.
pub async fn require_room(store: &dyn QuizStore, room_id: i64) -> Result<RoomEntity, ServiceError> {
    store
        .find_room(room_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room {room_id} not found")))
}

async fn require_owned_room(
    store: &dyn QuizStore,
    identity: Identity,
    room_id: i64,
) -> Result<RoomEntity, ServiceError> {
    let room = require_room(store, room_id).await?;
    if room.host_id != identity.user_id {
        return Err(ServiceError::Forbidden(format!(
            "room {room_id} belongs to another host"
        )));
    }
    Ok(room)
}

/// Create or rename the profile of the calling identity.
pub async fn upsert_profile(
    state: &SharedState,
    identity: Identity,
    request: UpdateProfileRequest,
) -> Result<UserProfile, ServiceError> {
    let store = state.require_quiz_store().await?;
    let user = UserEntity {
        id: identity.user_id,
        username: request.username,
    };
    store.upsert_user(user.clone()).await?;
    info!(user_id = user.id, username = %user.username, "profile saved");
    Ok(user.into())
}

/// Create a room owned by the calling host.
pub async fn create_room(
    state: &SharedState,
    identity: Identity,
    request: CreateRoomRequest,
) -> Result<RoomSummary, ServiceError> {
    if !identity.is_host() {
        return Err(ServiceError::Forbidden("only hosts can create rooms".into()));
    }
    if request.time_per_question == 0 {
        return Err(ServiceError::InvalidInput(
            "timePerQuestion must be positive".into(),
        ));
    }
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;

    let room = store
        .create_room(NewRoomEntity {
            host_id: identity.user_id,
            title: request.title,
            time_per_question: request.time_per_question,
            is_public: request.is_public,
            start_time: request.start_time.map(SystemTime::from),
        })
        .await?;
    info!(room_id = room.id, host_id = room.host_id, is_public = room.is_public, "room created");
    Ok(room.into())
}

/// Append a question to a room owned by the caller.
pub async fn add_question(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
    request: AddQuestionRequest,
) -> Result<QuestionSummary, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_owned_room(store.as_ref(), identity, room_id).await?;

    let question = store
        .add_question(NewQuestionEntity {
            room_id,
            text: request.text,
            options: request.options,
            correct_answer_index: request.correct_answer_index,
            image_url: request.image_url,
        })
        .await?;
    info!(room_id, question_id = question.id, order_index = question.order_index, "question added");
    Ok(question.into())
}

/// Set or clear the start time of a room owned by the caller.
pub async fn schedule_room(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
    request: ScheduleRoomRequest,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_owned_room(store.as_ref(), identity, room_id).await?;

    let start_time = request.start_time.map(SystemTime::from);
    if !store.schedule_room(room_id, start_time).await? {
        return Err(ServiceError::NotFound(format!("room {room_id} not found")));
    }
    info!(room_id, scheduled = start_time.is_some(), "room schedule updated");
    Ok(require_room(store.as_ref(), room_id).await?.into())
}

/// List a room owned by the caller in the room feed. The room needs at least one question.
pub async fn publish_room(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
) -> Result<RoomSummary, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_owned_room(store.as_ref(), identity, room_id).await?;

    if store.count_questions(room_id).await? == 0 {
        return Err(ServiceError::InvalidInput(
            "add questions before publishing".into(),
        ));
    }
    if !store.publish_room(room_id).await? {
        return Err(ServiceError::NotFound(format!("room {room_id} not found")));
    }
    info!(room_id, "room published");
    Ok(require_room(store.as_ref(), room_id).await?.into())
}

/// Register the caller as a participant. Hosts cannot join their own room.
pub async fn join_room(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
) -> Result<MembershipResponse, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    let room = require_room(store.as_ref(), room_id).await?;
    if room.host_id == identity.user_id {
        return Err(ServiceError::Forbidden(
            "hosts cannot participate in their own room".into(),
        ));
    }

    let changed = store.join_room(room_id, identity.user_id).await?;
    if changed {
        store.refresh_room_standings(room_id).await?;
        info!(room_id, user_id = identity.user_id, "participant joined");
    }
    Ok(MembershipResponse { room_id, changed })
}

/// Remove the caller from the participants of a room.
pub async fn leave_room(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
) -> Result<MembershipResponse, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    require_room(store.as_ref(), room_id).await?;

    let changed = store.leave_room(room_id, identity.user_id).await?;
    if changed {
        store.refresh_room_standings(room_id).await?;
        info!(room_id, user_id = identity.user_id, "participant left");
    }
    Ok(MembershipResponse { room_id, changed })
}

/// Serve the question at `index` of a self-paced room, stamped with the serving time.
///
/// Clients report `elapsedMs` measured from this response when they submit.
pub async fn self_paced_question(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
    index: usize,
) -> Result<SelfPacedQuestion, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    let room: Room = require_room(store.as_ref(), room_id).await?.try_into()?;
    if !room.is_public {
        return Err(ServiceError::InvalidState(
            "questions of private rooms follow the game clock".into(),
        ));
    }

    let questions = store.list_questions(room_id).await?;
    let question = questions.get(index).ok_or_else(|| {
        ServiceError::NotFound(format!("room {room_id} has no question at index {index}"))
    })?;

    Ok(SelfPacedQuestion {
        room_id,
        index,
        total: questions.len(),
        time_per_question: room.time_per_question.get(),
        question: question.into(),
        served_at: format_system_time(SystemTime::now()),
    })
}

#[cfg(all(test, feature = "sqlite-store"))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::quiz_store::sqlite::SqliteQuizStore,
        extractors::Role,
        state::AppState,
    };

    const HOST: Identity = Identity {
        user_id: 1,
        role: Role::Host,
    };
    const PLAYER: Identity = Identity {
        user_id: 2,
        role: Role::Participant,
    };

    async fn state_with_users() -> SharedState {
        let store = SqliteQuizStore::open_in_memory().unwrap();
        let state = AppState::with_store(AppConfig::default(), Arc::new(store)).await;
        for (identity, username) in [(HOST, "host"), (PLAYER, "ana")] {
            upsert_profile(
                &state,
                identity,
                UpdateProfileRequest {
                    username: username.into(),
                },
            )
            .await
            .unwrap();
        }
        state
    }

    fn room_request(is_public: bool) -> CreateRoomRequest {
        CreateRoomRequest {
            title: "Geography".into(),
            time_per_question: 20,
            is_public,
            start_time: None,
        }
    }

    fn question_request(text: &str) -> AddQuestionRequest {
        AddQuestionRequest {
            text: text.into(),
            options: vec!["Lima".into(), "Quito".into()],
            correct_answer_index: 0,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn participants_cannot_create_rooms() {
        let state = state_with_users().await;
        let err = create_room(&state, PLAYER, room_request(false)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn unknown_identities_are_unauthorized() {
        let state = state_with_users().await;
        let stranger = Identity {
            user_id: 99,
            role: Role::Host,
        };
        let err = create_room(&state, stranger, room_request(false)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn only_the_owner_edits_a_room() {
        let state = state_with_users().await;
        let room = create_room(&state, HOST, room_request(false)).await.unwrap();

        let err = add_question(&state, PLAYER, room.id, question_request("Peru?"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let first = add_question(&state, HOST, room.id, question_request("Peru?")).await.unwrap();
        let second = add_question(&state, HOST, room.id, question_request("Ecuador?")).await.unwrap();
        assert_eq!((first.order_index, second.order_index), (1, 2));
    }

    #[tokio::test]
    async fn publishing_requires_questions() {
        let state = state_with_users().await;
        let room = create_room(&state, HOST, room_request(true)).await.unwrap();

        let err = publish_room(&state, HOST, room.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        add_question(&state, HOST, room.id, question_request("Peru?")).await.unwrap();
        assert!(publish_room(&state, HOST, room.id).await.unwrap().is_published);
    }

    #[tokio::test]
    async fn join_and_leave_report_changes() {
        let state = state_with_users().await;
        let room = create_room(&state, HOST, room_request(false)).await.unwrap();

        assert!(join_room(&state, PLAYER, room.id).await.unwrap().changed);
        assert!(!join_room(&state, PLAYER, room.id).await.unwrap().changed);
        assert!(matches!(
            join_room(&state, HOST, room.id).await.unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        assert!(leave_room(&state, PLAYER, room.id).await.unwrap().changed);
        assert!(!leave_room(&state, PLAYER, room.id).await.unwrap().changed);
    }

    #[tokio::test]
    async fn self_paced_questions_are_served_by_index() {
        let state = state_with_users().await;
        let public = create_room(&state, HOST, room_request(true)).await.unwrap();
        add_question(&state, HOST, public.id, question_request("Peru?")).await.unwrap();

        let served = self_paced_question(&state, PLAYER, public.id, 0).await.unwrap();
        assert_eq!((served.index, served.total, served.time_per_question), (0, 1, 20));
        assert!(matches!(
            self_paced_question(&state, PLAYER, public.id, 1).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));

        let private = create_room(&state, HOST, room_request(false)).await.unwrap();
        assert!(matches!(
            self_paced_question(&state, PLAYER, private.id, 0).await.unwrap_err(),
            ServiceError::InvalidState(_)
        ));
    }
}
