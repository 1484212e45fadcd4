use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::dao::models::{
    AnswerRecordEntity, ParticipantEntity, QuestionEntity, RoomEntity, UserEntity,
};

fn to_u32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub username: String,
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            username: value.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoRoomDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub time_per_question: i64,
    pub start_time: Option<DateTime>,
    pub is_public: bool,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime,
}

impl From<MongoRoomDocument> for RoomEntity {
    fn from(value: MongoRoomDocument) -> Self {
        Self {
            id: value.id,
            host_id: value.host_id,
            title: value.title,
            time_per_question: to_u32(value.time_per_question),
            start_time: value.start_time.map(|start| start.to_system_time()),
            is_public: value.is_public,
            is_published: value.is_published,
            created_at: value.created_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoQuestionDocument {
    #[serde(rename = "_id")]
    pub id: i64,
    pub room_id: i64,
    pub order_index: i64,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime,
}

impl From<MongoQuestionDocument> for QuestionEntity {
    fn from(value: MongoQuestionDocument) -> Self {
        Self {
            id: value.id,
            room_id: value.room_id,
            order_index: value.order_index,
            text: value.text,
            options: value.options,
            correct_answer_index: to_u32(value.correct_answer_index),
            image_url: value.image_url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipantDocument {
    pub room_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub total_score: i64,
    pub position: Option<i64>,
    pub joined_at: DateTime,
}

impl From<MongoParticipantDocument> for ParticipantEntity {
    fn from(value: MongoParticipantDocument) -> Self {
        Self {
            room_id: value.room_id,
            user_id: value.user_id,
            total_score: value.total_score,
            position: value.position.map(to_u32),
            joined_at: value.joined_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerDocument {
    pub room_id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub selected_index: i64,
    pub is_correct: bool,
    pub score: i64,
    pub created_at: DateTime,
}

impl From<MongoAnswerDocument> for AnswerRecordEntity {
    fn from(value: MongoAnswerDocument) -> Self {
        Self {
            question_id: value.question_id,
            selected_index: to_u32(value.selected_index),
            is_correct: value.is_correct,
            score: to_u32(value.score),
            answered_at: value.created_at.to_system_time(),
        }
    }
}

/// Monotonic sequence used to hand out integer identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoCounterDocument {
    #[serde(rename = "_id")]
    pub name: String,
    pub seq: i64,
}

/// Output of the per-user answer aggregation.
#[derive(Debug, Clone, Deserialize)]
pub struct MongoTotalsDocument {
    #[serde(rename = "_id")]
    pub user_id: i64,
    pub score: i64,
    pub correct: i64,
    pub answered: i64,
    #[serde(default)]
    pub rooms_played: i64,
}
