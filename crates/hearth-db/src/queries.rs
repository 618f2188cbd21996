use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Connection;

use hearth_types::models::DEFAULT_ROLE;

use crate::models::{MessageRow, UserRow};
use crate::{Database, DbError, Result};

const USER_UNIQUE_COLUMNS: &[(&str, &'static str)] =
    &[("users.username", "username"), ("users.email", "email")];

impl Database {
    // -- Users --

    /// Insert a new account with the default role.
    /// Fails with [`DbError::Duplicate`] when the username or email is taken.
    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        family_code: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, family_code, role) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (id, username, email, password_hash, family_code, DEFAULT_ROLE),
            )
            .map_err(|e| DbError::from_insert(e, USER_UNIQUE_COLUMNS))?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, email, password, family_code, role, created_at FROM users WHERE email = ?1",
            )?;

            let row = stmt
                .query_row([email], |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        email: row.get(2)?,
                        password: row.get(3)?,
                        family_code: row.get(4)?,
                        role: row.get(5)?,
                        created_at: row.get(6)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }

    // -- Messages --

    pub fn insert_message(
        &self,
        id: &str,
        username: &str,
        message: &str,
        room: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        // Fixed-width UTC text so lexical order is chronological order.
        let ts = timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, username, message, room, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, username, message, room, &ts),
            )?;
            Ok(())
        })
    }

    /// The newest `limit` messages of a room, newest first.
    pub fn recent_messages(&self, room: &str, limit: u32) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_recent_messages(conn, room, limit))
    }

    pub fn count_messages(&self, room: &str) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages WHERE room = ?1",
                [room],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }
}

fn query_recent_messages(conn: &Connection, room: &str, limit: u32) -> Result<Vec<MessageRow>> {
    // rowid breaks ties between messages stored within the same microsecond
    let mut stmt = conn.prepare(
        "SELECT id, username, message, room, timestamp
         FROM messages
         WHERE room = ?1
         ORDER BY timestamp DESC, rowid DESC
         LIMIT ?2",
    )?;

    let rows = stmt
        .query_map(rusqlite::params![room, limit], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                username: row.get(1)?,
                message: row.get(2)?,
                room: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn add_user(db: &Database, username: &str, email: &str) -> Result<()> {
        db.create_user(&Uuid::new_v4().to_string(), username, email, "hash", "F1")
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        add_user(&db, "kim", "kim@x.com").unwrap();

        let err = add_user(&db, "lee", "kim@x.com").unwrap_err();
        assert!(matches!(err, DbError::Duplicate("email")), "got {:?}", err);
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        add_user(&db, "kim", "kim@x.com").unwrap();

        let err = add_user(&db, "kim", "other@x.com").unwrap_err();
        assert!(matches!(err, DbError::Duplicate("username")), "got {:?}", err);
    }

    #[test]
    fn new_user_gets_member_role() {
        let db = Database::open_in_memory().unwrap();
        add_user(&db, "kim", "kim@x.com").unwrap();

        let user = db.get_user_by_email("kim@x.com").unwrap().unwrap();
        assert_eq!(user.username, "kim");
        assert_eq!(user.family_code, "F1");
        assert_eq!(user.role, DEFAULT_ROLE);
        assert!(!user.created_at.is_empty());

        assert!(db.get_user_by_email("nobody@x.com").unwrap().is_none());
    }

    #[test]
    fn recent_messages_are_limited_and_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let start = Utc::now();
        for i in 0..60 {
            let ts = start + chrono::Duration::seconds(i);
            db.insert_message(&Uuid::new_v4().to_string(), "kim", &format!("m{}", i), "F1-family", ts)
                .unwrap();
        }
        db.insert_message(&Uuid::new_v4().to_string(), "lee", "elsewhere", "F2-family", start)
            .unwrap();

        let rows = db.recent_messages("F1-family", 50).unwrap();
        assert_eq!(rows.len(), 50);
        assert_eq!(rows[0].message, "m59");
        assert_eq!(rows[49].message, "m10");
        assert!(rows.iter().all(|r| r.room == "F1-family"));

        assert_eq!(db.count_messages("F1-family").unwrap(), 60);
        assert_eq!(db.count_messages("F2-family").unwrap(), 1);
    }

    #[test]
    fn same_timestamp_keeps_insert_order() {
        let db = Database::open_in_memory().unwrap();
        let ts = Utc::now();
        for text in ["first", "second", "third"] {
            db.insert_message(&Uuid::new_v4().to_string(), "kim", text, "F1-family", ts)
                .unwrap();
        }

        let rows = db.recent_messages("F1-family", 50).unwrap();
        let texts: Vec<&str> = rows.iter().map(|r| r.message.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[test]
    fn file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearth.db");

        {
            let db = Database::open(&path).unwrap();
            add_user(&db, "kim", "kim@x.com").unwrap();
            db.insert_message("m1", "kim", "hi", "F1-family", Utc::now()).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert!(db.get_user_by_email("kim@x.com").unwrap().is_some());
        assert_eq!(db.recent_messages("F1-family", 50).unwrap().len(), 1);
    }
}
