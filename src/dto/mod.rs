use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod answer;
pub mod game;
pub mod health;
pub mod leaderboard;
pub mod room;
pub mod sse;
pub mod validation;
pub mod ws;

/// RFC 3339 rendering of a timestamp for API payloads.
pub fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
