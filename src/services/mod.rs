/// Answer ledger: scoring and idempotent recording of submissions.
pub mod answer_service;
/// Periodic game-state and snapshot push.
pub mod broadcast_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Room and global leaderboards, participant standings.
pub mod leaderboard_service;
/// Push event names and publishing helpers.
pub mod push_events;
/// Profiles, rooms, questions and membership.
pub mod room_service;
/// Server-Sent Events streaming service.
pub mod sse_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// WebSocket connection and message handling service.
pub mod websocket_service;
