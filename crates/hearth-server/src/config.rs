use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

/// Secret used when `HEARTH_JWT_SECRET` is unset. Fine for local runs only.
pub const PLACEHOLDER_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: Option<chrono::Duration>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = get("HEARTH_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("HEARTH_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("HEARTH_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .context("HEARTH_HOST must be an IP address")?;

        let db_path = get("HEARTH_DB_PATH").unwrap_or_else(|| "hearth.db".into()).into();
        let jwt_secret = get("HEARTH_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_SECRET.into());

        let token_ttl = match get("HEARTH_TOKEN_TTL_HOURS") {
            Some(hours) => {
                let hours: i64 = hours
                    .parse()
                    .context("HEARTH_TOKEN_TTL_HOURS must be a whole number of hours")?;
                anyhow::ensure!(hours > 0, "HEARTH_TOKEN_TTL_HOURS must be positive");
                Some(chrono::Duration::hours(hours))
            }
            None => None,
        };

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
            token_ttl,
        })
    }
}
