pub mod admin;
pub mod auth;
pub mod error;
pub mod extract;
pub mod messages;
pub mod middleware;
pub mod pages;
pub mod session;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::FromRef,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;

use lounge_db::Database;

use crate::session::SessionStore;

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sessions: SessionStore,
    pub cookie_key: Key,
}

// Lets SignedCookieJar pull the signing key out of the router state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/", get(pages::index))
        .route("/login", get(pages::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/.well-known/health", get(health))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/send", post(messages::send))
        .route("/messages", get(messages::list))
        .route("/admin", get(admin::snapshot))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
