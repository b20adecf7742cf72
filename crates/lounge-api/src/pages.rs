use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::SignedCookieJar;

use crate::AppState;
use crate::session::SESSION_COOKIE;

const CHAT_PAGE: &str = include_str!("../static/chat.html");
const LOGIN_PAGE: &str = include_str!("../static/login.html");

/// The chat page. Page semantics: an anonymous visitor is redirected to
/// the login entry point instead of getting a bare 401.
pub async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> Response {
    let authenticated = match jar.get(SESSION_COOKIE) {
        Some(cookie) => state.sessions.get(cookie.value()).await.is_some(),
        None => false,
    };

    if authenticated {
        Html(CHAT_PAGE).into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}
