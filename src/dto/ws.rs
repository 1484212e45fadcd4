use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, Serialize, ToSchema, PartialEq, Eq)]
/// Messages accepted from viewer WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerInboundMessage {
    #[serde(rename_all = "camelCase")]
    JoinGame { room_id: i64 },
    #[serde(rename_all = "camelCase")]
    LeaveGame { room_id: i64 },
    SubscribeRooms,
    SubscribeGlobalLeaderboard,
    #[serde(other)]
    Unknown,
}

impl ViewerInboundMessage {
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
