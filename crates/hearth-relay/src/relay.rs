use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};
use uuid::Uuid;

use hearth_db::{Database, DbError};
use hearth_types::events::{ChatBroadcast, ServerFrame};

/// Identifies one live relay connection.
pub type ConnId = Uuid;

type FrameSender = mpsc::UnboundedSender<ServerFrame>;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to store message: {0}")]
    Store(#[from] DbError),

    #[error("store task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Membership changes and fan-out requests, applied one at a time by the
/// registry task.
enum Command {
    Connect { conn_id: ConnId, tx: FrameSender },
    Join { conn_id: ConnId, room: String },
    Broadcast { room: String, frame: ServerFrame },
    Disconnect { conn_id: ConnId },
    RoomSize { room: String, reply: oneshot::Sender<usize> },
}

/// Handle to the chat relay. Cheap to clone; every clone talks to the same
/// registry task.
#[derive(Clone)]
pub struct Relay {
    inner: Arc<RelayInner>,
}

struct RelayInner {
    commands: mpsc::UnboundedSender<Command>,
    db: Arc<Database>,
}

impl Relay {
    /// Spawn the registry task. Must be called inside a Tokio runtime.
    pub fn new(db: Arc<Database>) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_registry(rx));
        Self {
            inner: Arc::new(RelayInner { commands, db }),
        }
    }

    /// Register a new connection. Returns its id and the receiver that
    /// yields every frame broadcast to the room it joins.
    pub fn connect(&self) -> (ConnId, mpsc::UnboundedReceiver<ServerFrame>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.send(Command::Connect { conn_id, tx });
        (conn_id, rx)
    }

    /// Move a connection into `room`, leaving its previous room if any.
    pub fn join(&self, conn_id: ConnId, room: impl Into<String>) {
        self.send(Command::Join {
            conn_id,
            room: room.into(),
        });
    }

    /// Persist a message, then fan it out to every connection in `room`.
    /// Nothing is broadcast when the store write fails.
    pub async fn publish(&self, room: &str, username: &str, text: &str) -> Result<ChatBroadcast, RelayError> {
        let timestamp = chrono::Utc::now();

        // Run blocking DB insert off the async runtime
        let db = self.inner.db.clone();
        let id = Uuid::new_v4().to_string();
        let (r, u, t) = (room.to_string(), username.to_string(), text.to_string());
        tokio::task::spawn_blocking(move || db.insert_message(&id, &u, &t, &r, timestamp)).await??;

        let broadcast = ChatBroadcast {
            username: username.to_string(),
            message: text.to_string(),
            timestamp,
        };
        self.send(Command::Broadcast {
            room: room.to_string(),
            frame: ServerFrame::ChatMessage(broadcast.clone()),
        });
        Ok(broadcast)
    }

    /// Drop a connection and its room membership.
    pub fn disconnect(&self, conn_id: ConnId) {
        self.send(Command::Disconnect { conn_id });
    }

    /// Number of connections currently joined to `room`.
    pub async fn room_size(&self, room: &str) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RoomSize {
            room: room.to_string(),
            reply,
        });
        rx.await.unwrap_or(0)
    }

    fn send(&self, cmd: Command) {
        // The registry task only stops once every handle is gone.
        let _ = self.inner.commands.send(cmd);
    }
}

async fn run_registry(mut rx: mpsc::UnboundedReceiver<Command>) {
    let mut registry = Registry::default();
    while let Some(cmd) = rx.recv().await {
        registry.apply(cmd);
    }
    debug!("Relay registry stopped");
}

/// Room membership: room id -> subscribers, plus the reverse lookup used to
/// leave the old room on rejoin and disconnect.
#[derive(Default)]
struct Registry {
    connections: HashMap<ConnId, FrameSender>,
    rooms: HashMap<String, HashMap<ConnId, FrameSender>>,
    joined: HashMap<ConnId, String>,
}

impl Registry {
    fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { conn_id, tx } => {
                self.connections.insert(conn_id, tx);
            }
            Command::Join { conn_id, room } => self.join(conn_id, room),
            Command::Broadcast { room, frame } => self.broadcast(&room, &frame),
            Command::Disconnect { conn_id } => {
                self.leave(conn_id);
                self.connections.remove(&conn_id);
            }
            Command::RoomSize { room, reply } => {
                let _ = reply.send(self.rooms.get(&room).map_or(0, HashMap::len));
            }
        }
    }

    fn join(&mut self, conn_id: ConnId, room: String) {
        let Some(tx) = self.connections.get(&conn_id).cloned() else {
            debug!("join from unknown connection {}", conn_id);
            return;
        };

        self.leave(conn_id);
        info!("{} joined room {}", conn_id, room);
        self.rooms.entry(room.clone()).or_default().insert(conn_id, tx);
        self.joined.insert(conn_id, room);
    }

    fn leave(&mut self, conn_id: ConnId) {
        let Some(room) = self.joined.remove(&conn_id) else {
            return;
        };
        if let Some(members) = self.rooms.get_mut(&room) {
            members.remove(&conn_id);
            if members.is_empty() {
                self.rooms.remove(&room);
            }
        }
    }

    fn broadcast(&self, room: &str, frame: &ServerFrame) {
        let Some(members) = self.rooms.get(room) else {
            return;
        };
        for tx in members.values() {
            // A closed receiver means the connection is mid-teardown
            let _ = tx.send(frame.clone());
        }
    }
}
