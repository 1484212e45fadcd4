//! Answer ledger: scoring and idempotent recording of participant submissions.

use std::time::{Duration, SystemTime};

use tracing::info;

use crate::{
    dao::{models::AnswerEntity, quiz_store::QuizStore},
    dto::answer::{MyAnswer, MyStatusRequest, RoomCompletion, SubmitAnswerRequest, SubmitAnswerResponse},
    error::ServiceError,
    extractors::Identity,
    services::room_service::require_known_user,
    state::{
        SharedState,
        clock::ClockState,
        quiz::{Room, TimingMode},
        scoring::{award_points, self_paced_time_left},
    },
};

/// Time inputs of a submission.
#[derive(Debug, Clone, Copy)]
pub struct TimingContext {
    /// Server time the submission is evaluated at.
    pub now: SystemTime,
    /// Time the participant reports having spent on a self-paced question.
    pub client_elapsed: Option<Duration>,
}

impl TimingContext {
    /// Context for a submission received now.
    pub fn received_now(elapsed_ms: Option<u64>) -> Self {
        Self {
            now: SystemTime::now(),
            client_elapsed: elapsed_ms.map(Duration::from_millis),
        }
    }
}

/// Score and record an answer for the calling participant.
pub async fn submit_answer(
    state: &SharedState,
    identity: Identity,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    let timing = TimingContext::received_now(request.elapsed_ms);
    record_answer(store.as_ref(), identity.user_id, &request, timing).await
}

/// Score `request` against the stored answer key and upsert it into the ledger.
///
/// A resubmission for the same question overwrites the previous selection and score.
pub async fn record_answer(
    store: &dyn QuizStore,
    user_id: i64,
    request: &SubmitAnswerRequest,
    timing: TimingContext,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let question = store
        .find_question(request.room_id, request.question_id)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "question {} not found in room {}",
                request.question_id, request.room_id
            ))
        })?;
    let room: Room = store
        .find_room(request.room_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("room {} not found", request.room_id)))?
        .try_into()?;

    let time_left = time_left_for(store, &room, timing).await?;
    let is_correct = question.accepts(request.selected_index);
    let score = award_points(time_left, room.time_per_question, is_correct);

    store
        .upsert_answer(AnswerEntity {
            room_id: room.id,
            question_id: question.id,
            user_id,
            selected_index: request.selected_index,
            is_correct,
            score,
        })
        .await?;

    store.refresh_room_standings(room.id).await?;

    info!(
        room_id = room.id,
        question_id = question.id,
        user_id,
        is_correct,
        score,
        time_left,
        "answer recorded"
    );

    Ok(SubmitAnswerResponse {
        is_correct,
        score,
        time_left,
        time_per_question: room.time_per_question.get(),
    })
}

/// Seconds left on the question when the submission is scored.
///
/// Synchronized rooms read the server clock. Self-paced rooms trust the elapsed time
/// reported by the client, which is not verified; a missing report counts as zero.
async fn time_left_for(
    store: &dyn QuizStore,
    room: &Room,
    timing: TimingContext,
) -> Result<u32, ServiceError> {
    match room.mode() {
        TimingMode::SelfPaced => Ok(self_paced_time_left(
            timing.client_elapsed.unwrap_or_default(),
            room.time_per_question,
        )),
        TimingMode::Synchronized => {
            let total = usize::try_from(store.count_questions(room.id).await?).unwrap_or(usize::MAX);
            match room.clock(timing.now, total) {
                ClockState::NotStarted => Err(ServiceError::InvalidState("game not started".into())),
                ClockState::InProgress(active) => Ok(active.time_left_seconds),
                ClockState::Finished => Ok(0),
            }
        }
    }
}

/// The caller's own answers in a room.
pub async fn my_answers(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
) -> Result<Vec<MyAnswer>, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    let answers = store.list_user_answers(room_id, identity.user_id).await?;
    Ok(answers.into_iter().map(MyAnswer::from).collect())
}

/// Participation and completion of the caller for each requested room.
pub async fn my_status(
    state: &SharedState,
    identity: Identity,
    request: MyStatusRequest,
) -> Result<Vec<RoomCompletion>, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    if request.room_ids.is_empty() {
        return Ok(Vec::new());
    }
    let progress = store
        .user_room_progress(identity.user_id, request.room_ids)
        .await?;
    Ok(progress.into_iter().map(RoomCompletion::from).collect())
}
