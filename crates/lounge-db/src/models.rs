/// Database row types — these map directly to SQLite rows.
/// Distinct from lounge-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub author_id: String,
    pub author_username: String,
    pub author_is_admin: bool,
    pub body: String,
    pub created_at: String,
}
