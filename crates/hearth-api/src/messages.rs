use axum::{
    Extension, Json,
    extract::{Path, State},
};
use tracing::warn;

use hearth_db::models::MessageRow;
use hearth_types::api::{Claims, MessageResponse};
use hearth_types::models::HISTORY_LIMIT;

use crate::auth::AppState;
use crate::error::ApiError;

/// GET /api/messages/{room}: the latest messages of a room, oldest first.
///
/// Any valid token may read any room; the room id is not checked against
/// the caller's family code.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Extension(_claims): Extension<Claims>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    // Run blocking DB query off the async runtime
    let db = state.db.clone();
    let mut rows = tokio::task::spawn_blocking(move || db.recent_messages(&room, HISTORY_LIMIT)).await??;

    // Stored newest first; display order is oldest first
    rows.reverse();

    Ok(Json(rows.into_iter().map(to_response).collect()))
}

fn to_response(row: MessageRow) -> MessageResponse {
    let timestamp = chrono::DateTime::parse_from_rfc3339(&row.timestamp)
        .map(|ts| ts.with_timezone(&chrono::Utc))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on message '{}': {}", row.timestamp, row.id, e);
            chrono::DateTime::default()
        });

    MessageResponse {
        username: row.username,
        message: row.message,
        timestamp,
    }
}
