use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Registered user profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Identifier issued by the identity collaborator.
    pub id: i64,
    /// Unique display name shown on leaderboards.
    pub username: String,
}

/// Quiz room as persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomEntity {
    /// Primary key of the room.
    pub id: i64,
    /// User that created the room and may edit it.
    pub host_id: i64,
    /// Human readable title.
    pub title: String,
    /// Duration of every question, in seconds.
    pub time_per_question: u32,
    /// Scheduled start of the synchronized quiz.
    pub start_time: Option<SystemTime>,
    /// Public rooms are self-paced; private rooms follow the server clock.
    pub is_public: bool,
    /// Whether a public room is listed in the room feed.
    pub is_published: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Input used to create a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoomEntity {
    pub host_id: i64,
    pub title: String,
    pub time_per_question: u32,
    pub is_public: bool,
    pub start_time: Option<SystemTime>,
}

/// Multiple choice question attached to a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Primary key of the question.
    pub id: i64,
    /// Room owning the question.
    pub room_id: i64,
    /// 1-based position inside the room, unique per room.
    pub order_index: i64,
    /// Question prompt.
    pub text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Index of the correct option.
    pub correct_answer_index: u32,
    /// Optional illustration.
    pub image_url: Option<String>,
}

/// Input used to append a question to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestionEntity {
    pub room_id: i64,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: u32,
    pub image_url: Option<String>,
}

/// Scored answer, unique per `(room_id, question_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    pub room_id: i64,
    pub question_id: i64,
    pub user_id: i64,
    pub selected_index: u32,
    pub is_correct: bool,
    pub score: u32,
}

/// Answer row returned to its author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerRecordEntity {
    pub question_id: i64,
    pub selected_index: u32,
    pub is_correct: bool,
    pub score: u32,
    /// First time the answer was recorded.
    pub answered_at: SystemTime,
}

/// Room membership with its cached standing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantEntity {
    pub room_id: i64,
    pub user_id: i64,
    /// Cached sum of the participant's answer scores in the room.
    pub total_score: i64,
    /// Cached 1-based leaderboard position.
    pub position: Option<u32>,
    pub joined_at: SystemTime,
}

/// Aggregated totals of one user within a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardRowEntity {
    pub user_id: i64,
    pub username: String,
    pub score: i64,
    pub correct: i64,
    pub answered: i64,
}

/// Aggregated totals of one user across every room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalLeaderboardRowEntity {
    pub user_id: i64,
    pub username: String,
    pub score: i64,
    pub correct: i64,
    pub answered: i64,
    /// Distinct rooms the user answered in.
    pub rooms_played: i64,
}

/// Room eligible for the room feed, with its counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedRoomEntity {
    pub id: i64,
    pub title: String,
    pub is_public: bool,
    pub start_time: Option<SystemTime>,
    pub time_per_question: u32,
    pub question_count: i64,
    pub participant_count: i64,
}

/// Answer progress of one user in one room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomProgressEntity {
    pub room_id: i64,
    pub total_questions: i64,
    pub answered: i64,
}
