use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::SignedCookieJar;

use crate::AppState;
use crate::error::ApiError;
use crate::session::SESSION_COOKIE;

/// Session gate for content endpoints. A request is authenticated when the
/// signed session cookie is present, decodable, and names a token the
/// session store recognizes; the resolved identity is attached as a request
/// extension. Anything else is a plain 401 — API routes never redirect.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = SignedCookieJar::from_headers(req.headers(), state.cookie_key.clone());

    let cookie = jar.get(SESSION_COOKIE).ok_or(ApiError::Unauthorized)?;

    let user = state
        .sessions
        .get(cookie.value())
        .await
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
