use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, warn};

use hearth_types::events::{ChatBroadcast, ClientFrame, OutgoingChat, ServerFrame};

use crate::error::Result;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection to the chat relay.
pub struct RelayClient {
    sink: SplitSink<Socket, Message>,
    stream: SplitStream<Socket>,
}

impl RelayClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (socket, _) = connect_async(url).await?;
        debug!("connected to relay at {}", url);
        let (sink, stream) = socket.split();
        Ok(Self { sink, stream })
    }

    /// Subscribe to `room_id`, leaving the previous room.
    pub async fn join(&mut self, room_id: &str) -> Result<()> {
        self.send_frame(&ClientFrame::JoinRoom(room_id.to_string())).await
    }

    pub async fn send(&mut self, username: &str, message: &str, room_id: &str) -> Result<()> {
        self.send_frame(&ClientFrame::ChatMessage(OutgoingChat {
            username: username.to_string(),
            message: message.to_string(),
            room: room_id.to_string(),
        }))
        .await
    }

    /// Next chat message from the joined room. `None` once the server
    /// closes the connection.
    pub async fn next_message(&mut self) -> Result<Option<ChatBroadcast>> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => match serde_json::from_str::<ServerFrame>(text.as_str()) {
                    Ok(ServerFrame::ChatMessage(chat)) => return Ok(Some(chat)),
                    Err(e) => warn!("ignoring unknown relay frame: {}", e),
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<()> {
        self.sink.close().await?;
        Ok(())
    }

    async fn send_frame(&mut self, frame: &ClientFrame) -> Result<()> {
        let text = serde_json::to_string(frame)?;
        self.sink.send(Message::text(text)).await?;
        Ok(())
    }
}
