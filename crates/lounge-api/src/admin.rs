use axum::{Extension, Json, extract::State};
use tokio::task;
use tracing::warn;
use uuid::Uuid;

use lounge_db::queries::MessageOrder;
use lounge_types::api::{AdminSnapshot, UserEntry};
use lounge_types::session::SessionUser;

use crate::AppState;
use crate::error::ApiError;
use crate::messages::{entry_from_row, parse_created_at};

/// Aggregate view for admins: every user plus the full message log, newest
/// first. Gated on the admin flag carried by the session — a valid session
/// without it is forbidden.
pub async fn snapshot(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> Result<Json<AdminSnapshot>, ApiError> {
    if !user.is_admin {
        return Err(ApiError::Forbidden);
    }

    let db = state.db.clone();
    let (user_rows, message_rows) = task::spawn_blocking(move || -> anyhow::Result<_> {
        let users = db.list_users()?;
        let messages = db.list_messages(MessageOrder::NewestFirst)?;
        Ok((users, messages))
    })
    .await??;

    let users = user_rows
        .into_iter()
        .map(|row| UserEntry {
            id: row.id.parse().unwrap_or_else(|e| {
                warn!("Corrupt user id '{}': {}", row.id, e);
                Uuid::default()
            }),
            username: row.username,
            is_admin: row.is_admin,
            created_at: parse_created_at(&row.created_at),
        })
        .collect();

    let messages = message_rows.into_iter().map(entry_from_row).collect();

    Ok(Json(AdminSnapshot { users, messages }))
}
