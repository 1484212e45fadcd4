//! Points awarded for a single answer.

use std::{num::NonZeroU32, time::Duration};

/// Points granted for a correct answer submitted with the full duration left.
pub const MAX_POINTS: u32 = 100;

/// Score an answer from the time left on its question.
///
/// Correct answers earn `round(MAX_POINTS * time_left / time_per_question)`,
/// clamped to `[0, MAX_POINTS]`. Incorrect answers always earn zero.
pub fn award_points(time_left_seconds: u32, time_per_question: NonZeroU32, is_correct: bool) -> u32 {
    if !is_correct {
        return 0;
    }
    let duration = u64::from(time_per_question.get());
    let left = u64::from(time_left_seconds).min(duration);
    let points = (u64::from(MAX_POINTS) * left * 2 + duration) / (duration * 2);
    points.min(u64::from(MAX_POINTS)) as u32
}

/// Time left in a self-paced room, from the client-reported elapsed time.
///
/// Elapsed time is floored to whole seconds before being subtracted from the
/// question duration.
pub fn self_paced_time_left(client_elapsed: Duration, time_per_question: NonZeroU32) -> u32 {
    let elapsed_seconds = u32::try_from(client_elapsed.as_secs()).unwrap_or(u32::MAX);
    time_per_question.get().saturating_sub(elapsed_seconds)
}
