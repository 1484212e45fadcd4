use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dao::models::QuestionEntity,
    state::{
        clock::{ActiveQuestion, ClockState},
        quiz::RoomStatus,
    },
};

/// Question as shown to participants: the correct option is never included.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: i64,
    pub order_index: i64,
    pub text: String,
    pub options: Vec<String>,
    pub image_url: Option<String>,
}

impl From<&QuestionEntity> for QuestionView {
    fn from(value: &QuestionEntity) -> Self {
        Self {
            id: value.id,
            order_index: value.order_index,
            text: value.text.clone(),
            options: value.options.clone(),
            image_url: value.image_url.clone(),
        }
    }
}

/// Game state pushed to room viewers on every tick and returned on demand.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(untagged)]
pub enum GameStatePayload {
    /// A question is active.
    Active(ActiveGameState),
    /// Every question slot has elapsed.
    Finished(FinishedGameState),
    /// The room has no start time yet, starts later, or has no questions.
    NotStarted(NotStartedGameState),
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveGameState {
    pub room_id: i64,
    pub finished: bool,
    pub question: QuestionView,
    /// Zero-based index of the active question.
    pub index: usize,
    pub total: usize,
    /// Whole seconds left on the active question.
    pub time_left: u32,
    pub time_per_question: u32,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FinishedGameState {
    pub room_id: i64,
    pub finished: bool,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotStartedGameState {
    pub room_id: i64,
    pub error: String,
    /// Seconds until the scheduled start, when one is set in the future.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u64>,
}

impl GameStatePayload {
    /// Build the payload for a clock evaluation over `questions` (ordered).
    pub fn from_clock(
        room_id: i64,
        clock: ClockState,
        questions: &[QuestionEntity],
        time_per_question: u32,
        countdown_seconds: Option<u64>,
    ) -> Self {
        match clock {
            ClockState::InProgress(ActiveQuestion {
                index,
                time_left_seconds,
                total,
            }) => match questions.get(index) {
                Some(question) => GameStatePayload::Active(ActiveGameState {
                    room_id,
                    finished: false,
                    question: question.into(),
                    index,
                    total,
                    time_left: time_left_seconds,
                    time_per_question,
                }),
                None => Self::not_started(room_id, countdown_seconds),
            },
            ClockState::Finished => GameStatePayload::Finished(FinishedGameState {
                room_id,
                finished: true,
                total: questions.len(),
            }),
            ClockState::NotStarted => Self::not_started(room_id, countdown_seconds),
        }
    }

    fn not_started(room_id: i64, countdown_seconds: Option<u64>) -> Self {
        GameStatePayload::NotStarted(NotStartedGameState {
            room_id,
            error: "not started".into(),
            countdown_seconds,
        })
    }
}

/// Lifecycle label of a room in the feed.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatusDto {
    Waiting,
    Started,
    Ended,
    Published,
}

impl From<RoomStatus> for RoomStatusDto {
    fn from(value: RoomStatus) -> Self {
        match value {
            RoomStatus::Waiting => RoomStatusDto::Waiting,
            RoomStatus::Started => RoomStatusDto::Started,
            RoomStatus::Ended => RoomStatusDto::Ended,
            RoomStatus::Published => RoomStatusDto::Published,
        }
    }
}

/// Entry of the room feed snapshot.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomFeedItem {
    pub room_id: i64,
    pub title: String,
    pub is_public: bool,
    pub participant_count: i64,
    pub question_count: i64,
    pub status: RoomStatusDto,
    /// Seconds until a waiting room starts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown_seconds: Option<u64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn question(id: i64, order_index: i64) -> QuestionEntity {
        QuestionEntity {
            id,
            room_id: 3,
            order_index,
            text: format!("Q{order_index}"),
            options: vec!["yes".into(), "no".into()],
            correct_answer_index: 1,
            image_url: None,
        }
    }

    #[test]
    fn active_payload_hides_the_answer_key() {
        let questions = [question(10, 1), question(11, 2)];
        let payload = GameStatePayload::from_clock(
            3,
            ClockState::InProgress(ActiveQuestion {
                index: 1,
                time_left_seconds: 12,
                total: 2,
            }),
            &questions,
            20,
            None,
        );

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["finished"], json!(false));
        assert_eq!(value["question"]["id"], json!(11));
        assert_eq!(value["timeLeft"], json!(12));
        assert!(value["question"].get("correctAnswerIndex").is_none());
    }

    #[test]
    fn finished_and_not_started_shapes() {
        let finished = GameStatePayload::from_clock(3, ClockState::Finished, &[question(1, 1)], 20, None);
        assert_eq!(
            serde_json::to_value(&finished).unwrap(),
            json!({"roomId": 3, "finished": true, "total": 1})
        );

        let waiting = GameStatePayload::from_clock(3, ClockState::NotStarted, &[], 20, Some(4));
        assert_eq!(
            serde_json::to_value(&waiting).unwrap(),
            json!({"roomId": 3, "error": "not started", "countdownSeconds": 4})
        );
    }
}
