//! Server-authoritative quiz clock.
//!
//! The active question and the time left on it are derived from nothing but
//! the room's persisted start time, its per-question duration and the number
//! of questions. No per-room timer state exists anywhere in the process, so
//! every broadcast tick and every on-demand query agrees on the same answer.

use std::{
    num::NonZeroU32,
    time::{Duration, SystemTime},
};

/// Result of evaluating the clock of a room at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    /// No start time is scheduled, the start lies in the future, or the room has no questions.
    NotStarted,
    /// A question is currently active.
    InProgress(ActiveQuestion),
    /// Every question slot has elapsed.
    Finished,
}

/// Position of the clock inside a running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveQuestion {
    /// Zero-based index of the active question in `order_index` order.
    pub index: usize,
    /// Whole seconds left on the active question, rounded up.
    pub time_left_seconds: u32,
    /// Number of questions in the room.
    pub total: usize,
}

/// Derive the clock state of a room at `now`.
///
/// Elapsed time keeps millisecond precision internally and is truncated only
/// for the output fields: the question index is floored and the remaining
/// time is rounded up, so a freshly activated question reports its full
/// duration.
pub fn derive_clock(
    now: SystemTime,
    start_time: Option<SystemTime>,
    time_per_question: NonZeroU32,
    total_questions: usize,
) -> ClockState {
    let Some(start) = start_time else {
        return ClockState::NotStarted;
    };
    if total_questions == 0 {
        return ClockState::NotStarted;
    }
    let Ok(elapsed) = now.duration_since(start) else {
        return ClockState::NotStarted;
    };

    let slot_ms = u128::from(time_per_question.get()) * 1_000;
    let elapsed_ms = elapsed.as_millis();

    let index = elapsed_ms / slot_ms;
    if index >= total_questions as u128 {
        return ClockState::Finished;
    }

    let left_ms = slot_ms - (elapsed_ms % slot_ms);
    let time_left_seconds = left_ms.div_ceil(1_000);

    ClockState::InProgress(ActiveQuestion {
        index: index as usize,
        time_left_seconds: u32::try_from(time_left_seconds).unwrap_or(u32::MAX),
        total: total_questions,
    })
}

/// Whole seconds until `start`, rounded up, or `None` once it has passed.
pub fn countdown_seconds(now: SystemTime, start: SystemTime) -> Option<u64> {
    let remaining = start.duration_since(now).ok()?;
    if remaining == Duration::ZERO {
        return None;
    }
    Some(remaining.as_millis().div_ceil(1_000) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    fn at(start: SystemTime, offset_ms: u64) -> SystemTime {
        start + Duration::from_millis(offset_ms)
    }

    #[test]
    fn two_question_room_walks_through_every_state() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);

        assert_eq!(
            derive_clock(at(t0, 5_000), Some(t0), secs(30), 2),
            ClockState::InProgress(ActiveQuestion {
                index: 0,
                time_left_seconds: 25,
                total: 2,
            })
        );
        assert_eq!(
            derive_clock(at(t0, 35_000), Some(t0), secs(30), 2),
            ClockState::InProgress(ActiveQuestion {
                index: 1,
                time_left_seconds: 25,
                total: 2,
            })
        );
        assert_eq!(
            derive_clock(at(t0, 65_000), Some(t0), secs(30), 2),
            ClockState::Finished
        );
    }

    #[test]
    fn unscheduled_or_future_start_is_not_started() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        assert_eq!(derive_clock(t0, None, secs(10), 3), ClockState::NotStarted);
        assert_eq!(
            derive_clock(t0, Some(t0 + Duration::from_secs(1)), secs(10), 3),
            ClockState::NotStarted
        );
    }

    #[test]
    fn empty_room_never_starts() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        assert_eq!(
            derive_clock(at(t0, 500), Some(t0), secs(10), 0),
            ClockState::NotStarted
        );
    }

    #[test]
    fn fractional_elapsed_time_rounds_remaining_up() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let state = derive_clock(at(t0, 4_200), Some(t0), secs(10), 1);
        assert_eq!(
            state,
            ClockState::InProgress(ActiveQuestion {
                index: 0,
                time_left_seconds: 6,
                total: 1,
            })
        );
    }

    #[test]
    fn slot_boundary_starts_next_question_with_full_time() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000);
        let state = derive_clock(at(t0, 10_000), Some(t0), secs(10), 3);
        assert_eq!(
            state,
            ClockState::InProgress(ActiveQuestion {
                index: 1,
                time_left_seconds: 10,
                total: 3,
            })
        );
    }

    #[test]
    fn index_is_monotonic_and_finished_is_terminal() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(5_000);
        let mut last_index = 0;
        let mut finished_seen = false;

        for offset in (0..200_000).step_by(750) {
            let state = derive_clock(at(t0, offset), Some(t0), secs(7), 12);
            match state {
                ClockState::InProgress(active) => {
                    assert!(!finished_seen, "clock restarted after finishing");
                    assert!(active.index >= last_index);
                    assert!(active.time_left_seconds >= 1 && active.time_left_seconds <= 7);
                    last_index = active.index;
                }
                ClockState::Finished => finished_seen = true,
                ClockState::NotStarted => panic!("clock reported not started after start"),
            }
        }
        assert!(finished_seen);
    }

    #[test]
    fn derivation_is_idempotent() {
        let t0 = SystemTime::UNIX_EPOCH + Duration::from_secs(42);
        let now = at(t0, 12_345);
        assert_eq!(
            derive_clock(now, Some(t0), secs(9), 4),
            derive_clock(now, Some(t0), secs(9), 4)
        );
    }

    #[test]
    fn countdown_rounds_up_and_expires() {
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(100);
        assert_eq!(
            countdown_seconds(now, now + Duration::from_millis(1_200)),
            Some(2)
        );
        assert_eq!(countdown_seconds(now, now), None);
        assert_eq!(countdown_seconds(now, now - Duration::from_secs(1)), None);
    }
}
