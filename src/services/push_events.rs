use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        game::{GameStatePayload, RoomFeedItem},
        leaderboard::GlobalLeaderboardEntry,
        sse::{GlobalLeaderboardSnapshotEvent, RoomsSnapshotEvent, ServerEvent},
    },
    state::{SubscriptionRegistry, Topic},
};

pub const EVENT_GAME_STATE: &str = "game_state";
pub const EVENT_ROOMS_SNAPSHOT: &str = "rooms_snapshot";
pub const EVENT_GLOBAL_LEADERBOARD_SNAPSHOT: &str = "global_leaderboard_snapshot";

/// Build the game-state event of a room without publishing it.
pub fn game_state_event(payload: &GameStatePayload) -> Option<ServerEvent> {
    build_event(EVENT_GAME_STATE, payload)
}

/// Push the game state of `room_id` to its viewers.
pub fn publish_game_state(
    registry: &SubscriptionRegistry,
    room_id: i64,
    payload: &GameStatePayload,
) -> usize {
    send_event(registry, Topic::Game(room_id), EVENT_GAME_STATE, payload)
}

/// Push the room feed to its viewers.
pub fn publish_rooms_snapshot(registry: &SubscriptionRegistry, rooms: Vec<RoomFeedItem>) -> usize {
    send_event(
        registry,
        Topic::RoomsFeed,
        EVENT_ROOMS_SNAPSHOT,
        &RoomsSnapshotEvent(rooms),
    )
}

/// Push the global leaderboard to its viewers.
pub fn publish_global_leaderboard(
    registry: &SubscriptionRegistry,
    entries: Vec<GlobalLeaderboardEntry>,
) -> usize {
    send_event(
        registry,
        Topic::GlobalLeaderboard,
        EVENT_GLOBAL_LEADERBOARD_SNAPSHOT,
        &GlobalLeaderboardSnapshotEvent(entries),
    )
}

fn build_event(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize push payload");
            None
        }
    }
}

fn send_event(
    registry: &SubscriptionRegistry,
    topic: Topic,
    event: &str,
    payload: &impl Serialize,
) -> usize {
    build_event(event, payload)
        .map(|event| registry.publish(topic, event))
        .unwrap_or(0)
}
