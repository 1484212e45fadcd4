//! Periodic push of game state, room feed and global leaderboard to subscribed viewers.
//!
//! Game ticks only evaluate rooms that currently have a viewer. Every evaluation is
//! derived from persisted data and the current time, so ticks need no per-room memory.

use std::{num::NonZeroU32, time::SystemTime};

use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use crate::{
    dao::quiz_store::QuizStore,
    dto::game::{GameStatePayload, RoomFeedItem},
    error::ServiceError,
    services::{leaderboard_service::load_global_leaderboard, push_events, room_service::require_room},
    state::{
        SharedState, Topic,
        clock::{ClockState, countdown_seconds},
        quiz::{Room, room_status},
    },
};

/// Game state of `room_id` at `now`.
pub async fn game_state(
    store: &dyn QuizStore,
    room_id: i64,
    now: SystemTime,
) -> Result<GameStatePayload, ServiceError> {
    let room: Room = require_room(store, room_id).await?.try_into()?;
    let questions = store.list_questions(room_id).await?;
    let clock = room.clock(now, questions.len());
    let countdown = match clock {
        ClockState::NotStarted => room.start_time.and_then(|start| countdown_seconds(now, start)),
        _ => None,
    };
    Ok(GameStatePayload::from_clock(
        room_id,
        clock,
        &questions,
        room.time_per_question.get(),
        countdown,
    ))
}

/// Game state of `room_id` right now, as served on demand.
pub async fn current_game_state(
    state: &SharedState,
    room_id: i64,
) -> Result<GameStatePayload, ServiceError> {
    let store = state.require_quiz_store().await?;
    game_state(store.as_ref(), room_id, SystemTime::now()).await
}

/// Rooms listed in the feed at `now`, with their lifecycle label.
pub async fn rooms_snapshot(
    store: &dyn QuizStore,
    now: SystemTime,
) -> Result<Vec<RoomFeedItem>, ServiceError> {
    let rooms = store.list_feed_rooms().await?;
    Ok(rooms
        .into_iter()
        .filter_map(|room| {
            let Some(time_per_question) = NonZeroU32::new(room.time_per_question) else {
                warn!(room_id = room.id, "skipping room without question duration");
                return None;
            };
            let total = usize::try_from(room.question_count).unwrap_or_default();
            let (status, countdown_seconds) =
                room_status(room.is_public, room.start_time, time_per_question, total, now);
            Some(RoomFeedItem {
                room_id: room.id,
                title: room.title,
                is_public: room.is_public,
                participant_count: room.participant_count,
                question_count: room.question_count,
                status: status.into(),
                countdown_seconds,
            })
        })
        .collect())
}

/// Evaluate and push the game state of `room_id` to its viewers.
pub async fn push_game_state(
    state: &SharedState,
    room_id: i64,
) -> Result<usize, ServiceError> {
    let payload = current_game_state(state, room_id).await?;
    Ok(push_events::publish_game_state(state.registry(), room_id, &payload))
}

/// One game tick: push the state of every watched room.
///
/// A failing room is logged and skipped so the other rooms still receive their update.
pub async fn game_tick(state: &SharedState) {
    let registry = state.registry();
    let pruned = registry.prune();
    if pruned > 0 {
        debug!(pruned, "dropped topics without subscribers");
    }

    let rooms = registry.active_game_rooms();
    if rooms.is_empty() {
        return;
    }
    let Ok(store) = state.require_quiz_store().await else {
        debug!("skipping game tick while degraded");
        return;
    };

    let now = SystemTime::now();
    for room_id in rooms {
        match game_state(store.as_ref(), room_id, now).await {
            Ok(payload) => {
                push_events::publish_game_state(registry, room_id, &payload);
            }
            Err(err) => warn!(room_id, error = %err, "failed to evaluate game state"),
        }
    }
}

/// One snapshot tick: push the room feed and the global leaderboard to their viewers.
pub async fn snapshot_tick(state: &SharedState) {
    let registry = state.registry();
    let wants_rooms = registry.has_subscribers(Topic::RoomsFeed);
    let wants_leaderboard = registry.has_subscribers(Topic::GlobalLeaderboard);
    if !wants_rooms && !wants_leaderboard {
        return;
    }
    let Ok(store) = state.require_quiz_store().await else {
        debug!("skipping snapshot tick while degraded");
        return;
    };

    if wants_rooms {
        match rooms_snapshot(store.as_ref(), SystemTime::now()).await {
            Ok(rooms) => {
                push_events::publish_rooms_snapshot(registry, rooms);
            }
            Err(err) => warn!(error = %err, "failed to build rooms snapshot"),
        }
    }
    if wants_leaderboard {
        match load_global_leaderboard(store.as_ref()).await {
            Ok(entries) => {
                push_events::publish_global_leaderboard(registry, entries);
            }
            Err(err) => warn!(error = %err, "failed to build global leaderboard snapshot"),
        }
    }
}

/// Spawn the game and snapshot loops using the configured cadences.
pub fn spawn(state: SharedState) -> [JoinHandle<()>; 2] {
    let game_loop_state = state.clone();
    let game_period = state.config().game_tick();
    let game = tokio::spawn(async move {
        let mut ticker = interval(game_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            game_tick(&game_loop_state).await;
        }
    });

    let snapshot_period = state.config().snapshot_tick();
    let snapshot = tokio::spawn(async move {
        let mut ticker = interval(snapshot_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            snapshot_tick(&state).await;
        }
    });

    info!(
        game_tick_ms = game_period.as_millis() as u64,
        snapshot_tick_ms = snapshot_period.as_millis() as u64,
        "broadcast loops started"
    );
    [game, snapshot]
}

#[cfg(all(test, feature = "sqlite-store"))]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::Value;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{NewQuestionEntity, NewRoomEntity, UserEntity},
            quiz_store::sqlite::SqliteQuizStore,
        },
        dto::game::RoomStatusDto,
        state::AppState,
    };

    async fn store_with_room(
        is_public: bool,
        start_time: Option<SystemTime>,
        questions: usize,
    ) -> (SqliteQuizStore, i64) {
        let store = SqliteQuizStore::open_in_memory().unwrap();
        store
            .upsert_user(UserEntity {
                id: 1,
                username: "host".into(),
            })
            .await
            .unwrap();
        let room = store
            .create_room(NewRoomEntity {
                host_id: 1,
                title: "Planets".into(),
                time_per_question: 30,
                is_public,
                start_time,
            })
            .await
            .unwrap();
        for idx in 0..questions {
            store
                .add_question(NewQuestionEntity {
                    room_id: room.id,
                    text: format!("Planet {idx}?"),
                    options: vec!["Mars".into(), "Venus".into()],
                    correct_answer_index: 1,
                    image_url: None,
                })
                .await
                .unwrap();
        }
        (store, room.id)
    }

    #[tokio::test]
    async fn game_state_follows_the_clock() {
        let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        let (store, room_id) = store_with_room(false, Some(start), 2).await;

        let waiting = game_state(&store, room_id, start - Duration::from_secs(3)).await.unwrap();
        assert!(matches!(
            waiting,
            GameStatePayload::NotStarted(ref state) if state.countdown_seconds == Some(3)
        ));

        let active = game_state(&store, room_id, start + Duration::from_secs(35)).await.unwrap();
        match active {
            GameStatePayload::Active(state) => {
                assert_eq!((state.index, state.total, state.time_left), (1, 2, 25));
                assert_eq!(state.question.order_index, 2);
            }
            other => panic!("unexpected payload {other:?}"),
        }

        let done = game_state(&store, room_id, start + Duration::from_secs(65)).await.unwrap();
        assert!(matches!(done, GameStatePayload::Finished(_)));
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let (store, room_id) = store_with_room(false, None, 1).await;
        assert!(matches!(
            game_state(&store, room_id + 1, SystemTime::now()).await.unwrap_err(),
            ServiceError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn snapshot_labels_rooms() {
        let now = SystemTime::now();
        let (store, room_id) =
            store_with_room(false, Some(now + Duration::from_secs(90)), 1).await;

        let rooms = rooms_snapshot(&store, now).await.unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_id, room_id);
        assert_eq!(rooms[0].status, RoomStatusDto::Waiting);
        assert_eq!(rooms[0].countdown_seconds, Some(90));
    }

    #[tokio::test]
    async fn game_tick_reaches_room_viewers() {
        let start = SystemTime::now() - Duration::from_secs(1);
        let (store, room_id) = store_with_room(false, Some(start), 1).await;
        let state = AppState::with_store(AppConfig::default(), Arc::new(store)).await;
        let mut viewer = state.registry().subscribe(Topic::Game(room_id));

        game_tick(&state).await;

        let event = viewer.try_recv().unwrap();
        assert_eq!(event.event.as_deref(), Some(push_events::EVENT_GAME_STATE));
        let payload: Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(payload["roomId"], Value::from(room_id));
        assert_eq!(payload["finished"], Value::from(false));
    }

    #[tokio::test]
    async fn failing_room_does_not_block_others() {
        let start = SystemTime::now() - Duration::from_secs(1);
        let (store, room_id) = store_with_room(false, Some(start), 1).await;
        let state = AppState::with_store(AppConfig::default(), Arc::new(store)).await;
        let _missing = state.registry().subscribe(Topic::Game(room_id + 100));
        let mut viewer = state.registry().subscribe(Topic::Game(room_id));

        game_tick(&state).await;

        assert!(viewer.try_recv().is_ok());
    }

    #[tokio::test]
    async fn snapshot_tick_skips_unwatched_topics() {
        let (store, _room_id) = store_with_room(true, None, 1).await;
        let state = AppState::with_store(AppConfig::default(), Arc::new(store)).await;
        let mut leaderboard = state.registry().subscribe(Topic::GlobalLeaderboard);

        snapshot_tick(&state).await;

        let event = leaderboard.try_recv().unwrap();
        assert_eq!(
            event.event.as_deref(),
            Some(push_events::EVENT_GLOBAL_LEADERBOARD_SNAPSHOT)
        );
        assert_eq!(event.data, "[]");
        assert!(!state.registry().has_subscribers(Topic::RoomsFeed));
    }
}
