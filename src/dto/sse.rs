use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::dto::{
    game::RoomFeedItem,
    leaderboard::GlobalLeaderboardEntry,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across push channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }

    /// Frame sent to WebSocket viewers: `{"event": <name>, "data": <payload>}`.
    pub fn to_ws_frame(&self) -> serde_json::Result<String> {
        let data: Value = serde_json::from_str(&self.data)?;
        serde_json::to_string(&json!({
            "event": self.event,
            "data": data,
        }))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast every snapshot tick to room feed viewers.
pub struct RoomsSnapshotEvent(pub Vec<RoomFeedItem>);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast every snapshot tick to global leaderboard viewers.
pub struct GlobalLeaderboardSnapshotEvent(pub Vec<GlobalLeaderboardEntry>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_frame_embeds_payload_as_json() {
        let event = ServerEvent::json(Some("game_state".to_string()), &json!({"roomId": 4})).unwrap();
        let frame: Value = serde_json::from_str(&event.to_ws_frame().unwrap()).unwrap();
        assert_eq!(frame, json!({"event": "game_state", "data": {"roomId": 4}}));
    }
}
