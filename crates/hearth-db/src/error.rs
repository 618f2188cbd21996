use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// A UNIQUE column already holds this value. Carries the column name.
    #[error("{0} already exists")]
    Duplicate(&'static str),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("DB lock poisoned")]
    LockPoisoned,
}

impl DbError {
    /// Classify an insert failure, turning UNIQUE violations on the listed
    /// columns into [`DbError::Duplicate`].
    pub(crate) fn from_insert(err: rusqlite::Error, unique: &[(&str, &'static str)]) -> Self {
        if let rusqlite::Error::SqliteFailure(ref code, Some(ref msg)) = err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                for (qualified, field) in unique {
                    if msg.contains(qualified) {
                        return DbError::Duplicate(*field);
                    }
                }
            }
        }
        DbError::Sqlite(err)
    }
}
