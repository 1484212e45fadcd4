use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::{AnswerRecordEntity, RoomProgressEntity};
use crate::dto::format_system_time;

/// Answer submitted by a participant.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[validate(range(min = 1))]
    pub room_id: i64,
    #[validate(range(min = 1))]
    pub question_id: i64,
    pub selected_index: u32,
    /// Milliseconds since the question was served. Only read for public rooms.
    #[serde(default)]
    pub elapsed_ms: Option<u64>,
}

/// Scoring outcome of a submission.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub is_correct: bool,
    pub score: u32,
    pub time_left: u32,
    pub time_per_question: u32,
}

/// One of the caller's own answers in a room.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyAnswer {
    pub question_id: i64,
    pub selected_index: u32,
    pub is_correct: bool,
    pub score: u32,
    pub answered_at: String,
}

impl From<AnswerRecordEntity> for MyAnswer {
    fn from(value: AnswerRecordEntity) -> Self {
        Self {
            question_id: value.question_id,
            selected_index: value.selected_index,
            is_correct: value.is_correct,
            score: value.score,
            answered_at: format_system_time(value.answered_at),
        }
    }
}

/// Rooms whose completion the caller wants to know.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MyStatusRequest {
    #[validate(length(max = 200))]
    #[serde(default)]
    pub room_ids: Vec<i64>,
}

/// Participation summary of the caller in one room.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomCompletion {
    pub room_id: i64,
    /// At least one answer was recorded.
    pub participated: bool,
    /// Every question of a non-empty room was answered.
    pub completed: bool,
}

impl From<RoomProgressEntity> for RoomCompletion {
    fn from(value: RoomProgressEntity) -> Self {
        Self {
            room_id: value.room_id,
            participated: value.answered > 0,
            completed: value.total_questions > 0 && value.answered >= value.total_questions,
        }
    }
}
