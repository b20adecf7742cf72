use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::State;
use axum::response::Redirect;
use axum_extra::extract::SignedCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use tokio::task;
use uuid::Uuid;

use lounge_types::api::LoginRequest;
use lounge_types::session::SessionUser;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::FormOrJson;
use crate::session::SESSION_COOKIE;

/// Verify credentials and establish a session. The response never reveals
/// whether the username or the password was wrong. Failures are terminal
/// per request — no lockout or throttling.
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    FormOrJson(req): FormOrJson<LoginRequest>,
) -> Result<(SignedCookieJar, Redirect), ApiError> {
    let db = state.db.clone();
    let username = req.username.clone();
    let user = task::spawn_blocking(move || db.get_user_by_username(&username))
        .await??
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Storage(anyhow::anyhow!("corrupt password hash: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Storage(anyhow::anyhow!("corrupt user id '{}': {e}", user.id)))?;

    let token = state
        .sessions
        .insert(SessionUser {
            id: user_id,
            username: user.username,
            is_admin: user.is_admin,
        })
        .await;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    Ok((jar.add(cookie), Redirect::to("/")))
}

/// Destroy the session named by the cookie (if any) and clear the cookie.
/// Safe to call without a session.
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> (SignedCookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value()).await;
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");

    (jar.remove(removal), Redirect::to("/login"))
}
