use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{QuestionEntity, RoomEntity, UserEntity},
    dto::{
        format_system_time,
        game::QuestionView,
        validation::{validate_answer_key, validate_options, validate_username},
    },
};

fn default_time_per_question() -> u32 {
    30
}

/// Profile of the resolved identity.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_username"))]
    pub username: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
}

impl From<UserEntity> for UserProfile {
    fn from(value: UserEntity) -> Self {
        Self {
            id: value.id,
            username: value.username,
        }
    }
}

/// Payload used by a host to create a room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default = "default_time_per_question")]
    #[validate(range(min = 1, max = 3600))]
    pub time_per_question: u32,
    /// Public rooms are self-paced, private rooms follow the server clock.
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_time: Option<OffsetDateTime>,
}

/// Set (or clear, with `null`) the start of a synchronized room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRoomRequest {
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub start_time: Option<OffsetDateTime>,
}

/// Room as returned to its host.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub time_per_question: u32,
    pub is_public: bool,
    pub is_published: bool,
    pub start_time: Option<String>,
    pub created_at: String,
}

impl From<RoomEntity> for RoomSummary {
    fn from(value: RoomEntity) -> Self {
        Self {
            id: value.id,
            host_id: value.host_id,
            title: value.title,
            time_per_question: value.time_per_question,
            is_public: value.is_public,
            is_published: value.is_published,
            start_time: value.start_time.map(format_system_time),
            created_at: format_system_time(value.created_at),
        }
    }
}

/// Multiple choice question appended to a room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_answer_key"))]
pub struct AddQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[validate(custom(function = "validate_options"))]
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    #[serde(default)]
    #[validate(url)]
    pub image_url: Option<String>,
}

/// Question as returned to the host, answer key included.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub id: i64,
    pub room_id: i64,
    pub order_index: i64,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    pub image_url: Option<String>,
}

impl From<QuestionEntity> for QuestionSummary {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            room_id: value.room_id,
            order_index: value.order_index,
            text: value.text,
            options: value.options,
            correct_answer_index: value.correct_answer_index,
            image_url: value.image_url,
        }
    }
}

/// Outcome of a join or leave request.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipResponse {
    pub room_id: i64,
    /// Whether the call changed the membership.
    pub changed: bool,
}

/// Caller's progress and cached standing in a room.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomStanding {
    pub room_id: i64,
    pub total: i64,
    pub answered: i64,
    pub completed: bool,
    pub total_score: i64,
    pub position: Option<u32>,
}

/// Question of a self-paced room served to a participant.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelfPacedQuestion {
    pub room_id: i64,
    /// Zero-based index of the question.
    pub index: usize,
    pub total: usize,
    pub time_per_question: u32,
    pub question: QuestionView,
    /// Server time the question was served; `elapsedMs` is measured from here.
    pub served_at: String,
}
