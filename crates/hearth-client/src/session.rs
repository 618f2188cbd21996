use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64URL;

use hearth_types::api::Claims;
use hearth_types::models::{DEFAULT_ROOM, room_id};

use crate::error::{ClientError, Result};

/// Top-level tabs of the family app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Chat,
    Calendar,
    Games,
}

/// A logged-in user: the bearer token, what it claims, and which room and
/// tab are showing.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    claims: Claims,
    room: String,
    section: Section,
}

impl Session {
    /// Build a session from a token issued by `/api/login`. The payload is
    /// decoded but not verified; the server checks the signature.
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self {
            token,
            claims,
            room: DEFAULT_ROOM.to_string(),
            section: Section::default(),
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn username(&self) -> &str {
        &self.claims.username
    }

    pub fn family_code(&self) -> &str {
        &self.claims.family_code
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Room name without the family prefix, e.g. `family`.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Relay key of the current room, e.g. `F1-family`.
    pub fn room_id(&self) -> String {
        room_id(&self.claims.family_code, &self.room)
    }

    /// Switch rooms and return the new relay key to join.
    pub fn switch_room(&mut self, room: impl Into<String>) -> String {
        self.room = room.into();
        self.room_id()
    }

    pub fn section(&self) -> Section {
        self.section
    }

    pub fn show(&mut self, section: Section) {
        self.section = section;
    }
}

/// Decode the claims segment of a JWT without checking its signature.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::MalformedToken("missing payload segment".into()))?;

    let bytes = B64URL
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::MalformedToken(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| ClientError::MalformedToken(e.to_string()))
}
