use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use serde_json::json;
use thiserror::Error;
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    dto::{sse::ServerEvent, ws::ViewerInboundMessage},
    error::ServiceError,
    services::{broadcast_service, push_events},
    state::{SharedState, Topic},
};

const EVENT_ERROR: &str = "error";

type Forwarders = HashMap<Topic, JoinHandle<()>>;

/// Errors raised while serving a viewer command.
#[derive(Debug, Error)]
enum ViewerError {
    /// Writer channel closed - connection should be terminated immediately.
    #[error("connection closed")]
    ConnectionClosed,
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
}

/// Handle the full lifecycle of a viewer WebSocket connection.
///
/// Each subscribed topic gets a forwarder task copying broadcast events into the
/// connection's writer channel. Forwarders are aborted on leave and on disconnect.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let mut forwarders = Forwarders::new();
    info!("viewer connected");

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ViewerInboundMessage::from_json_str(&text) {
                Ok(command) => {
                    match handle_command(&state, command, &outbound_tx, &mut forwarders).await {
                        Ok(()) => {}
                        Err(ViewerError::ConnectionClosed) => break,
                        Err(ViewerError::Service(err)) => {
                            warn!(error = %err, "viewer command failed");
                            if send_error(&outbound_tx, &err.to_string()).is_err() {
                                break;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(error = %err, payload = %text, "failed to parse viewer message");
                    if send_error(&outbound_tx, "malformed message").is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(error = %err, "websocket receive error");
                break;
            }
        }
    }

    for (_, forwarder) in forwarders.drain() {
        forwarder.abort();
    }
    info!("viewer disconnected");
    finalize(writer_task, outbound_tx).await;
}

async fn handle_command(
    state: &SharedState,
    command: ViewerInboundMessage,
    tx: &mpsc::UnboundedSender<Message>,
    forwarders: &mut Forwarders,
) -> Result<(), ViewerError> {
    match command {
        ViewerInboundMessage::JoinGame { room_id } => {
            let topic = Topic::Game(room_id);
            // Subscribe before evaluating so no tick falls between the snapshot and the stream.
            let receiver = state.registry().subscribe(topic);
            let payload = broadcast_service::current_game_state(state, room_id).await?;
            if let Some(event) = push_events::game_state_event(&payload) {
                send_event(tx, &event)?;
            }
            attach(forwarders, topic, receiver, tx);
            info!(room_id, "viewer joined game");
        }
        ViewerInboundMessage::LeaveGame { room_id } => {
            if let Some(forwarder) = forwarders.remove(&Topic::Game(room_id)) {
                forwarder.abort();
                info!(room_id, "viewer left game");
            }
        }
        ViewerInboundMessage::SubscribeRooms => {
            let receiver = state.registry().subscribe(Topic::RoomsFeed);
            attach(forwarders, Topic::RoomsFeed, receiver, tx);
        }
        ViewerInboundMessage::SubscribeGlobalLeaderboard => {
            let receiver = state.registry().subscribe(Topic::GlobalLeaderboard);
            attach(forwarders, Topic::GlobalLeaderboard, receiver, tx);
        }
        ViewerInboundMessage::Unknown => {
            debug!("ignoring unknown viewer message");
        }
    }
    Ok(())
}

fn attach(
    forwarders: &mut Forwarders,
    topic: Topic,
    receiver: broadcast::Receiver<ServerEvent>,
    tx: &mpsc::UnboundedSender<Message>,
) {
    let forwarder = spawn_forwarder(topic, receiver, tx.clone());
    if let Some(previous) = forwarders.insert(topic, forwarder) {
        previous.abort();
    }
}

fn spawn_forwarder(
    topic: Topic,
    mut receiver: broadcast::Receiver<ServerEvent>,
    tx: mpsc::UnboundedSender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if send_event(&tx, &event).is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(?topic, skipped, "viewer lagging");
                    continue;
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn send_event(tx: &mpsc::UnboundedSender<Message>, event: &ServerEvent) -> Result<(), ViewerError> {
    let frame = match event.to_ws_frame() {
        Ok(frame) => frame,
        Err(err) => {
            warn!(error = %err, "failed to encode websocket frame");
            return Ok(());
        }
    };
    tx.send(Message::Text(frame.into()))
        .map_err(|_| ViewerError::ConnectionClosed)
}

fn send_error(tx: &mpsc::UnboundedSender<Message>, message: &str) -> Result<(), ViewerError> {
    let frame = json!({ "event": EVENT_ERROR, "data": { "message": message } }).to_string();
    tx.send(Message::Text(frame.into()))
        .map_err(|_| ViewerError::ConnectionClosed)
}

async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
