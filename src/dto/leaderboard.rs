use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::{GlobalLeaderboardRowEntity, LeaderboardRowEntity};

/// Row of a room leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomLeaderboardEntry {
    /// 1-based position.
    pub rank: u32,
    pub user_id: i64,
    pub username: String,
    pub score: i64,
    pub correct: i64,
    pub answered: i64,
}

/// Row of the global leaderboard.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalLeaderboardEntry {
    /// 1-based position.
    pub rank: u32,
    pub user_id: i64,
    pub username: String,
    pub score: i64,
    pub correct: i64,
    pub answered: i64,
    pub rooms_played: i64,
}

/// Attach ranks to rows already sorted in leaderboard order.
pub fn rank_room_rows(rows: Vec<LeaderboardRowEntity>) -> Vec<RoomLeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| RoomLeaderboardEntry {
            rank: idx as u32 + 1,
            user_id: row.user_id,
            username: row.username,
            score: row.score,
            correct: row.correct,
            answered: row.answered,
        })
        .collect()
}

/// Attach ranks to rows already sorted in leaderboard order.
pub fn rank_global_rows(rows: Vec<GlobalLeaderboardRowEntity>) -> Vec<GlobalLeaderboardEntry> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| GlobalLeaderboardEntry {
            rank: idx as u32 + 1,
            user_id: row.user_id,
            username: row.username,
            score: row.score,
            correct: row.correct,
            answered: row.answered,
            rooms_played: row.rooms_played,
        })
        .collect()
}
