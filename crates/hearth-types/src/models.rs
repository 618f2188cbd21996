/// Role given to every newly registered account.
pub const DEFAULT_ROLE: &str = "member";

/// Room a client lands in after logging in.
pub const DEFAULT_ROOM: &str = "family";

/// Maximum number of messages returned by a history fetch.
pub const HISTORY_LIMIT: u32 = 50;

/// Relay key for a family's room: `{family_code}-{room_name}`.
pub fn room_id(family_code: &str, room_name: &str) -> String {
    format!("{}-{}", family_code, room_name)
}
