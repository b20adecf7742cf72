use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use tokio::task;
use tracing::warn;

use lounge_db::models::MessageRow;
use lounge_db::queries::MessageOrder;
use lounge_types::api::{MessageEntry, SendMessageRequest};
use lounge_types::session::SessionUser;

use crate::AppState;
use crate::error::ApiError;

/// Append one message to the shared log. The body is trimmed; an empty
/// result is rejected before touching the store. No length cap, no
/// deduplication.
pub async fn send(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(req): Json<SendMessageRequest>,
) -> Result<StatusCode, ApiError> {
    let body = req.text.trim().to_string();
    if body.is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    // Run the blocking DB insert off the async runtime
    let db = state.db.clone();
    let author_id = user.id.to_string();
    task::spawn_blocking(move || db.insert_message(&author_id, &body)).await??;

    Ok(StatusCode::OK)
}

/// Full message history, oldest first. Clients poll this on a fixed
/// interval and re-render from scratch.
pub async fn list(
    State(state): State<AppState>,
    Extension(_user): Extension<SessionUser>,
) -> Result<Json<Vec<MessageEntry>>, ApiError> {
    let db = state.db.clone();
    let rows = task::spawn_blocking(move || db.list_messages(MessageOrder::OldestFirst)).await??;

    Ok(Json(rows.into_iter().map(entry_from_row).collect()))
}

pub(crate) fn entry_from_row(row: MessageRow) -> MessageEntry {
    MessageEntry {
        id: row.id,
        timestamp: parse_created_at(&row.created_at),
        text: row.body,
        username: row.author_username,
        is_admin: row.author_is_admin,
    }
}

pub(crate) fn parse_created_at(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}': {}", raw, e);
            DateTime::default()
        })
}
