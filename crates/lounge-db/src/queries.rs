use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::Connection;

/// Display order for the message log. Polling clients read oldest-first;
/// the admin snapshot reads newest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrder {
    OldestFirst,
    NewestFirst,
}

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, is_admin) VALUES (?1, ?2, ?3, ?4)",
                (id, username, password_hash, is_admin),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, password, is_admin, created_at
                 FROM users
                 ORDER BY username ASC",
            )?;

            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Messages --

    /// Append one message. Returns the assigned id.
    pub fn insert_message(&self, author_id: &str, body: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO messages (author_id, body) VALUES (?1, ?2)",
                (author_id, body),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Full message history joined with sender identity. No pagination —
    /// the traffic model is low write volume with full-table reads.
    pub fn list_messages(&self, order: MessageOrder) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, order))
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password, is_admin, created_at FROM users WHERE username = ?1",
    )?;

    let row = stmt.query_row([username], user_from_row).optional()?;

    Ok(row)
}

fn query_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn
        .prepare("SELECT id, username, password, is_admin, created_at FROM users WHERE id = ?1")?;

    let row = stmt.query_row([id], user_from_row).optional()?;

    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn query_messages(conn: &Connection, order: MessageOrder) -> Result<Vec<MessageRow>> {
    // JOIN users to fetch sender identity in a single query (eliminates N+1).
    // Ordering is (created_at, id): SQLite's datetime('now') has second
    // resolution, so the rowid breaks ties in insertion order.
    let sql = match order {
        MessageOrder::OldestFirst => {
            "SELECT m.id, m.author_id, u.username, u.is_admin, m.body, m.created_at
             FROM messages m
             LEFT JOIN users u ON m.author_id = u.id
             ORDER BY m.created_at ASC, m.id ASC"
        }
        MessageOrder::NewestFirst => {
            "SELECT m.id, m.author_id, u.username, u.is_admin, m.body, m.created_at
             FROM messages m
             LEFT JOIN users u ON m.author_id = u.id
             ORDER BY m.created_at DESC, m.id DESC"
        }
    };

    let mut stmt = conn.prepare(sql)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                author_id: row.get(1)?,
                author_username: row
                    .get::<_, Option<String>>(2)?
                    .unwrap_or_else(|| "unknown".to_string()),
                author_is_admin: row.get::<_, Option<bool>>(3)?.unwrap_or(false),
                body: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
