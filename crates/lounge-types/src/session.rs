use uuid::Uuid;

/// Authenticated identity bound to a live session. Stored in the in-process
/// session store and attached to requests as an extension by the session
/// gate middleware.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub is_admin: bool,
}
