//! Integration tests: drive the real router with an in-memory database,
//! carrying the session cookie between requests by hand.

use std::sync::Arc;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum_extra::extract::cookie::Key;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use lounge_api::AppState;
use lounge_api::session::SessionStore;
use lounge_db::Database;

fn test_app() -> (Router, Arc<Database>) {
    let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
    let state = AppState {
        db: db.clone(),
        sessions: SessionStore::new(),
        cookie_key: Key::generate(),
    };
    (lounge_api::router(state), db)
}

fn provision(db: &Database, username: &str, password: &str, admin: bool) {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("hash password")
        .to_string();
    db.create_user(&Uuid::new_v4().to_string(), username, &hash, admin)
        .expect("create user");
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Option<String>) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": username, "password": password }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    (resp.status(), cookie)
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> (StatusCode, Value) {
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn send_message(app: &Router, cookie: &str, text: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/send")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::COOKIE, cookie)
                .body(Body::from(json!({ "text": text }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

#[tokio::test]
async fn login_establishes_session_with_stored_admin_flag() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);
    provision(&db, "root", "toor-secret", true);

    let (status, alice_cookie) = login(&app, "alice", "wonderland").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let alice_cookie = alice_cookie.expect("alice gets a session cookie");

    let (status, root_cookie) = login(&app, "root", "toor-secret").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let root_cookie = root_cookie.expect("root gets a session cookie");

    // The session's admin flag mirrors the stored flag: alice is refused
    // the admin view, root is not.
    let (status, _) = get_with_cookie(&app, "/admin", &alice_cookie).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = get_with_cookie(&app, "/admin", &root_cookie).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_rejects_invalid_credentials() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    let (status, cookie) = login(&app, "alice", "not-her-password").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());

    let (status, cookie) = login(&app, "nobody", "whatever").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());
}

#[tokio::test]
async fn login_accepts_form_bodies() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=alice&password=wonderland"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(resp.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn sent_message_is_attributed_and_ordered() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);
    provision(&db, "root", "toor-secret", true);

    let (_, alice_cookie) = login(&app, "alice", "wonderland").await;
    let alice_cookie = alice_cookie.unwrap();
    let (_, root_cookie) = login(&app, "root", "toor-secret").await;
    let root_cookie = root_cookie.unwrap();

    assert_eq!(send_message(&app, &alice_cookie, "hi").await, StatusCode::OK);
    assert_eq!(
        send_message(&app, &root_cookie, "welcome").await,
        StatusCode::OK
    );

    let (status, body) = get_with_cookie(&app, "/messages", &alice_cookie).await;
    assert_eq!(status, StatusCode::OK);

    let messages = body.as_array().expect("messages array");
    assert_eq!(messages.len(), 2);

    // Oldest first; alice sent before root.
    assert_eq!(messages[0]["username"], "alice");
    assert_eq!(messages[0]["is_admin"], false);
    assert_eq!(messages[0]["text"], "hi");

    assert_eq!(messages[1]["username"], "root");
    assert_eq!(messages[1]["is_admin"], true);
    assert_eq!(messages[1]["text"], "welcome");
}

#[tokio::test]
async fn blank_message_is_rejected_without_a_row() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    let (_, cookie) = login(&app, "alice", "wonderland").await;
    let cookie = cookie.unwrap();

    assert_eq!(
        send_message(&app, &cookie, "  \t\n ").await,
        StatusCode::BAD_REQUEST
    );
    assert_eq!(send_message(&app, &cookie, "").await, StatusCode::BAD_REQUEST);

    let (_, body) = get_with_cookie(&app, "/messages", &cookie).await;
    assert_eq!(body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn message_body_is_trimmed_before_storing() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    let (_, cookie) = login(&app, "alice", "wonderland").await;
    let cookie = cookie.unwrap();

    assert_eq!(send_message(&app, &cookie, "  hi  ").await, StatusCode::OK);

    let (_, body) = get_with_cookie(&app, "/messages", &cookie).await;
    assert_eq!(body.as_array().unwrap()[0]["text"], "hi");
}

#[tokio::test]
async fn admin_snapshot_shows_users_and_messages_newest_first() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);
    provision(&db, "root", "toor-secret", true);

    let (_, alice_cookie) = login(&app, "alice", "wonderland").await;
    let alice_cookie = alice_cookie.unwrap();
    let (_, root_cookie) = login(&app, "root", "toor-secret").await;
    let root_cookie = root_cookie.unwrap();

    send_message(&app, &alice_cookie, "hi").await;
    send_message(&app, &alice_cookie, "anyone here?").await;

    let (status, body) = get_with_cookie(&app, "/admin", &root_cookie).await;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().expect("users array");
    let names: Vec<&str> = users.iter().filter_map(|u| u["username"].as_str()).collect();
    assert!(names.contains(&"alice"));
    assert!(names.contains(&"root"));
    // Password hashes never leave the server.
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let messages = body["messages"].as_array().expect("messages array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["text"], "anyone here?");
    assert_eq!(messages[1]["text"], "hi");
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    let (_, cookie) = login(&app, "alice", "wonderland").await;
    let cookie = cookie.unwrap();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/login");

    // The old cookie no longer names a live session.
    let (status, _) = get_with_cookie(&app, "/messages", &cookie).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn content_endpoints_require_a_session() {
    let (app, _db) = test_app();

    for uri in ["/messages", "/admin"] {
        let resp = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/send")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "text": "hi" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn forged_cookie_is_unauthorized() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    // Unsigned value: the signed jar refuses it before the store is consulted.
    let (status, _) = get_with_cookie(
        &app,
        "/messages",
        "lounge_session=11111111-2222-3333-4444-555555555555",
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn index_redirects_anonymous_visitors_to_login() {
    let (app, db) = test_app();
    provision(&db, "alice", "wonderland", false);

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()[header::LOCATION], "/login");

    // Authenticated visitors get the chat page.
    let (_, cookie) = login(&app, "alice", "wonderland").await;
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::COOKIE, cookie.unwrap())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn health_check_is_unauthenticated() {
    let (app, _db) = test_app();

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/.well-known/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["status"], "ok");
}
