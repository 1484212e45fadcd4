//! Leaderboard aggregation over the answer ledger.

use crate::{
    dao::quiz_store::QuizStore,
    dto::{
        leaderboard::{GlobalLeaderboardEntry, RoomLeaderboardEntry, rank_global_rows, rank_room_rows},
        room::RoomStanding,
    },
    error::ServiceError,
    extractors::Identity,
    services::room_service::{require_known_user, require_room},
    state::SharedState,
};

/// Ranked totals of every user who answered in `room_id`.
pub async fn room_leaderboard(
    state: &SharedState,
    room_id: i64,
) -> Result<Vec<RoomLeaderboardEntry>, ServiceError> {
    let store = state.require_quiz_store().await?;
    load_room_leaderboard(store.as_ref(), room_id).await
}

/// Room leaderboard read straight from `store`; the room must exist.
pub async fn load_room_leaderboard(
    store: &dyn QuizStore,
    room_id: i64,
) -> Result<Vec<RoomLeaderboardEntry>, ServiceError> {
    require_room(store, room_id).await?;
    let rows = store.room_leaderboard(room_id).await?;
    Ok(rank_room_rows(rows))
}

/// Ranked totals of every user across all rooms.
pub async fn global_leaderboard(
    state: &SharedState,
) -> Result<Vec<GlobalLeaderboardEntry>, ServiceError> {
    let store = state.require_quiz_store().await?;
    load_global_leaderboard(store.as_ref()).await
}

/// Global leaderboard read straight from `store`.
pub async fn load_global_leaderboard(
    store: &dyn QuizStore,
) -> Result<Vec<GlobalLeaderboardEntry>, ServiceError> {
    let rows = store.global_leaderboard().await?;
    Ok(rank_global_rows(rows))
}

/// Progress of the caller in a room plus the cached score and position.
pub async fn room_standing(
    state: &SharedState,
    identity: Identity,
    room_id: i64,
) -> Result<RoomStanding, ServiceError> {
    let store = state.require_quiz_store().await?;
    require_known_user(store.as_ref(), identity.user_id).await?;
    require_room(store.as_ref(), room_id).await?;

    let participant = store.find_participant(room_id, identity.user_id).await?;
    let progress = store
        .user_room_progress(identity.user_id, vec![room_id])
        .await?
        .into_iter()
        .next();
    let (total, answered) = progress
        .map(|progress| (progress.total_questions, progress.answered))
        .unwrap_or_default();

    Ok(RoomStanding {
        room_id,
        total,
        answered,
        completed: total > 0 && answered >= total,
        total_score: participant.as_ref().map_or(0, |p| p.total_score),
        position: participant.and_then(|p| p.position),
    })
}
