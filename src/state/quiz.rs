//! Runtime view of a quiz room and its lifecycle label.

use std::{num::NonZeroU32, time::SystemTime};

use crate::{
    dao::models::{QuestionEntity, RoomEntity},
    error::ServiceError,
    state::clock::{ClockState, countdown_seconds, derive_clock},
};

/// How the time left on a question is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingMode {
    /// Private rooms: every participant follows the server clock from the start time.
    Synchronized,
    /// Public rooms: each participant reports how long they looked at the question.
    SelfPaced,
}

/// Room with a validated question duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: i64,
    pub host_id: i64,
    pub title: String,
    pub time_per_question: NonZeroU32,
    pub start_time: Option<SystemTime>,
    pub is_public: bool,
    pub is_published: bool,
}

impl Room {
    /// Timing mode implied by the room visibility.
    pub fn mode(&self) -> TimingMode {
        if self.is_public {
            TimingMode::SelfPaced
        } else {
            TimingMode::Synchronized
        }
    }

    /// Clock of the room at `now` for `total_questions` questions.
    pub fn clock(&self, now: SystemTime, total_questions: usize) -> ClockState {
        derive_clock(now, self.start_time, self.time_per_question, total_questions)
    }
}

impl TryFrom<RoomEntity> for Room {
    type Error = ServiceError;

    fn try_from(value: RoomEntity) -> Result<Self, Self::Error> {
        let time_per_question = NonZeroU32::new(value.time_per_question).ok_or_else(|| {
            ServiceError::InvalidState(format!("room {} has no question duration", value.id))
        })?;
        Ok(Self {
            id: value.id,
            host_id: value.host_id,
            title: value.title,
            time_per_question,
            start_time: value.start_time,
            is_public: value.is_public,
            is_published: value.is_published,
        })
    }
}

impl QuestionEntity {
    /// Whether `selected_index` designates the correct option.
    pub fn accepts(&self, selected_index: u32) -> bool {
        selected_index == self.correct_answer_index
    }
}

/// Lifecycle label shown in the room feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// Synchronized room whose start time lies ahead.
    Waiting,
    /// Synchronized room with an active question.
    Started,
    /// Synchronized room whose every question slot has elapsed.
    Ended,
    /// Self-paced room open to anyone at any time.
    Published,
}

/// Feed label for a room, with the countdown to its start when waiting.
pub fn room_status(
    is_public: bool,
    start_time: Option<SystemTime>,
    time_per_question: NonZeroU32,
    total_questions: usize,
    now: SystemTime,
) -> (RoomStatus, Option<u64>) {
    if is_public {
        return (RoomStatus::Published, None);
    }
    match derive_clock(now, start_time, time_per_question, total_questions) {
        ClockState::NotStarted => (
            RoomStatus::Waiting,
            start_time.and_then(|start| countdown_seconds(now, start)),
        ),
        ClockState::InProgress(_) => (RoomStatus::Started, None),
        ClockState::Finished => (RoomStatus::Ended, None),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn entity(time_per_question: u32, is_public: bool) -> RoomEntity {
        RoomEntity {
            id: 7,
            host_id: 1,
            title: "Pub quiz".into(),
            time_per_question,
            start_time: None,
            is_public,
            is_published: false,
            created_at: SystemTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn zero_duration_room_is_rejected() {
        assert!(matches!(
            Room::try_from(entity(0, false)),
            Err(ServiceError::InvalidState(_))
        ));
    }

    #[test]
    fn visibility_selects_timing_mode() {
        let private = Room::try_from(entity(30, false)).unwrap();
        let public = Room::try_from(entity(30, true)).unwrap();
        assert_eq!(private.mode(), TimingMode::Synchronized);
        assert_eq!(public.mode(), TimingMode::SelfPaced);
    }

    #[test]
    fn status_tracks_the_clock() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let tpq = NonZeroU32::new(10).unwrap();

        assert_eq!(
            room_status(false, Some(start), tpq, 2, start - Duration::from_millis(4_500)),
            (RoomStatus::Waiting, Some(5))
        );
        assert_eq!(
            room_status(false, Some(start), tpq, 2, start + Duration::from_secs(3)),
            (RoomStatus::Started, None)
        );
        assert_eq!(
            room_status(false, Some(start), tpq, 2, start + Duration::from_secs(20)),
            (RoomStatus::Ended, None)
        );
        assert_eq!(
            room_status(true, None, tpq, 2, start),
            (RoomStatus::Published, None)
        );
    }
}
