use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use lounge_types::session::SessionUser;

/// Name of the signed cookie carrying the session token.
pub const SESSION_COOKIE: &str = "lounge_session";

/// Process-held session store: opaque token -> authenticated identity.
/// The token itself travels in a signed cookie; a cookie that fails
/// signature verification never reaches this map. Restarting the process
/// empties the store and invalidates every outstanding cookie.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, SessionUser>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a session for an authenticated user. Returns the token.
    pub async fn insert(&self, user: SessionUser) -> String {
        let token = Uuid::new_v4().to_string();
        self.inner.write().await.insert(token.clone(), user);
        token
    }

    pub async fn get(&self, token: &str) -> Option<SessionUser> {
        self.inner.read().await.get(token).cloned()
    }

    /// Destroy a session. Returns the identity it was bound to, if any.
    pub async fn remove(&self, token: &str) -> Option<SessionUser> {
        self.inner.write().await.remove(token)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
