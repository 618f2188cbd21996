//! Terminal chat: log in, show the room's history, then relay stdin lines
//! to the room and print whatever the room receives.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use hearth_client::{ApiClient, RelayClient, Session};
use hearth_types::models::DEFAULT_ROOM;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hearth_chat=info,hearth_client=info".into()),
        )
        .init();

    let url = std::env::var("HEARTH_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".into());
    let email = std::env::var("HEARTH_EMAIL").context("HEARTH_EMAIL is not set")?;
    let password = std::env::var("HEARTH_PASSWORD").context("HEARTH_PASSWORD is not set")?;
    let room = std::env::var("HEARTH_ROOM").unwrap_or_else(|_| DEFAULT_ROOM.into());

    let api = ApiClient::new(url);
    let login = api.login(&email, &password).await?;
    let mut session = Session::from_token(login.token)?;
    let room_id = session.switch_room(room);
    info!("Logged in as {} ({})", session.username(), session.family_code());

    for msg in api.messages(session.token(), &room_id).await? {
        println!("[{}] {}: {}", msg.timestamp.format("%H:%M"), msg.username, msg.message);
    }

    let mut relay = RelayClient::connect(&api.relay_url()).await?;
    relay.join(&room_id).await?;
    info!("Joined {}", room_id);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let text = line.trim();
                if !text.is_empty() {
                    relay.send(session.username(), text, &room_id).await?;
                }
            }
            incoming = relay.next_message() => {
                let Some(msg) = incoming? else {
                    info!("Relay closed the connection");
                    break;
                };
                println!("[{}] {}: {}", msg.timestamp.format("%H:%M"), msg.username, msg.message);
            }
        }
    }

    relay.close().await?;
    Ok(())
}
