/// Database row types. These map directly to SQLite rows and are kept
/// separate from the hearth-types wire models.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub family_code: String,
    pub role: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub username: String,
    pub message: String,
    pub room: String,
    pub timestamp: String,
}
