mod config;

use std::sync::Arc;

use tracing::{info, warn};

use hearth_api::{AppState, AppStateInner, AuthConfig};
use hearth_relay::Relay;

use crate::config::{PLACEHOLDER_SECRET, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hearth=debug,hearth_api=debug,hearth_relay=debug,hearth_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = ServerConfig::from_env()?;
    if config.jwt_secret == PLACEHOLDER_SECRET {
        warn!("HEARTH_JWT_SECRET is unset; tokens are signed with the development placeholder");
    }
    match config.token_ttl {
        Some(ttl) => info!("Tokens expire after {} hours", ttl.num_hours()),
        None => info!("Tokens are issued without expiry"),
    }

    // Init database
    let db = Arc::new(hearth_db::Database::open(&config.db_path)?);

    // Shared state
    let relay = Relay::new(db.clone());
    let state: AppState = Arc::new(AppStateInner {
        db,
        auth: AuthConfig {
            jwt_secret: config.jwt_secret,
            token_ttl: config.token_ttl,
        },
        relay,
    });

    let app = hearth_api::router(state);

    info!("Hearth server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
