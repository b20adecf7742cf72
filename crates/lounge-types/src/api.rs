use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub text: String,
}

/// One entry in the shared message log, annotated with sender identity
/// for display.
#[derive(Debug, Serialize)]
pub struct MessageEntry {
    pub id: i64,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub is_admin: bool,
}

// -- Admin --

#[derive(Debug, Serialize)]
pub struct UserEntry {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Flat snapshot of everything an admin may inspect: all users plus the
/// full message log, newest first.
#[derive(Debug, Serialize)]
pub struct AdminSnapshot {
    pub users: Vec<UserEntry>,
    pub messages: Vec<MessageEntry>,
}
