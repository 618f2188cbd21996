use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{error, info, warn};

use hearth_types::events::{ClientFrame, OutgoingChat};

use crate::relay::{ConnId, Relay};

/// Longest slice of an undecodable frame that is echoed into the log.
const RAW_PREVIEW_CHARS: usize = 200;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Drive one relay WebSocket until either side goes away.
///
/// The connection starts unjoined; the client is expected to send
/// `join-room` first. Room ids are taken as given.
pub async fn handle_connection(socket: WebSocket, relay: Relay) {
    let (mut sender, mut receiver) = socket.split();
    let (conn_id, mut frames) = relay.connect();

    info!("{} connected to relay", conn_id);

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward room broadcasts -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                frame = frames.recv() => {
                    let Some(frame) = frame else { break };
                    let text = match serde_json::to_string(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("failed to encode frame: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read frames from client
    let relay_recv = relay.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => handle_text(&relay_recv, conn_id, &text).await,
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    relay.disconnect(conn_id);
    info!("{} disconnected from relay", conn_id);
}

async fn handle_text(relay: &Relay, conn_id: ConnId, text: &str) {
    match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => handle_frame(relay, conn_id, frame).await,
        Err(e) => warn!("{} bad frame: {} -- raw: {}", conn_id, e, preview(text)),
    }
}

/// The first [`RAW_PREVIEW_CHARS`] characters of `text`, cut on a char boundary.
fn preview(text: &str) -> &str {
    text.char_indices()
        .nth(RAW_PREVIEW_CHARS)
        .map_or(text, |(end, _)| &text[..end])
}

async fn handle_frame(relay: &Relay, conn_id: ConnId, frame: ClientFrame) {
    match frame {
        ClientFrame::JoinRoom(room) => relay.join(conn_id, room),

        ClientFrame::ChatMessage(OutgoingChat {
            username,
            message,
            room,
        }) => {
            let fields = [("username", &username), ("room", &room), ("message", &message)];
            if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
                warn!("{} chat-message with blank {}, dropped", conn_id, name);
                return;
            }
            // Store failures are logged and the message dropped; the
            // sender is not told.
            if let Err(e) = relay.publish(&room, &username, &message).await {
                error!("{} failed to publish to {}: {}", conn_id, room, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hearth_db::Database;
    use hearth_types::events::ServerFrame;

    use super::*;

    fn relay() -> (Relay, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        (Relay::new(db.clone()), db)
    }

    fn chat(username: &str, message: &str, room: &str) -> ClientFrame {
        ClientFrame::ChatMessage(OutgoingChat {
            username: username.into(),
            message: message.into(),
            room: room.into(),
        })
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        let short = "가나다";
        assert_eq!(preview(short), short);

        let long = "가".repeat(RAW_PREVIEW_CHARS + 10);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), RAW_PREVIEW_CHARS);
        assert_eq!(cut.len(), RAW_PREVIEW_CHARS * "가".len());
    }

    #[tokio::test]
    async fn long_multibyte_garbage_is_logged_and_skipped() {
        // Log arguments are only formatted when a subscriber is listening.
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (relay, db) = relay();
        let (conn_id, mut frames) = relay.connect();
        relay.join(conn_id, "F1-family");

        let garbage = format!(r#"{{"event":"x","data":"{}"}}"#, "가".repeat(100));
        assert!(!garbage.is_char_boundary(RAW_PREVIEW_CHARS));
        handle_text(&relay, conn_id, &garbage).await;

        handle_text(
            &relay,
            conn_id,
            r#"{"event":"chat-message","data":{"username":"kim","message":"hi","room":"F1-family"}}"#,
        )
        .await;
        assert_eq!(relay.room_size("F1-family").await, 1);

        let ServerFrame::ChatMessage(msg) = frames.try_recv().unwrap();
        assert_eq!(msg.message, "hi");
        assert_eq!(db.count_messages("F1-family").unwrap(), 1);
    }

    #[tokio::test]
    async fn blank_chat_fields_are_dropped() {
        let (relay, db) = relay();
        let (conn_id, mut frames) = relay.connect();
        relay.join(conn_id, "F1-family");

        handle_frame(&relay, conn_id, chat("kim", "hi", "  ")).await;
        handle_frame(&relay, conn_id, chat("", "hi", "F1-family")).await;
        handle_frame(&relay, conn_id, chat("kim", " \n ", "F1-family")).await;
        assert_eq!(relay.room_size("F1-family").await, 1);
        assert!(frames.try_recv().is_err());
        assert_eq!(db.count_messages("  ").unwrap(), 0);
        assert_eq!(db.count_messages("F1-family").unwrap(), 0);

        handle_frame(&relay, conn_id, chat("kim", "hi", "F1-family")).await;
        relay.room_size("F1-family").await;
        let ServerFrame::ChatMessage(msg) = frames.try_recv().unwrap();
        assert_eq!(msg.username, "kim");
        assert_eq!(db.count_messages("F1-family").unwrap(), 1);
    }
}
