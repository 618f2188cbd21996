use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id           TEXT PRIMARY KEY,
            username     TEXT NOT NULL UNIQUE,
            email        TEXT NOT NULL UNIQUE,
            password     TEXT NOT NULL,
            family_code  TEXT NOT NULL,
            role         TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        -- No foreign key to users: username is copied onto each message.
        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL,
            message     TEXT NOT NULL,
            room        TEXT NOT NULL,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_room
            ON messages(room, timestamp);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
