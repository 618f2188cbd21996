use serde::{Deserialize, Serialize};

/// Frames sent FROM client TO server over the relay WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientFrame {
    /// Subscribe to a room, leaving whichever room was joined before
    JoinRoom(String),

    /// Post a message to a room
    ChatMessage(OutgoingChat),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingChat {
    pub username: String,
    pub message: String,
    pub room: String,
}

/// Frames sent FROM server TO client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerFrame {
    /// A message was posted to the room this connection is joined to
    ChatMessage(ChatBroadcast),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    pub username: String,
    pub message: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
