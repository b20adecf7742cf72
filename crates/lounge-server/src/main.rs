use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use tower_http::trace::TraceLayer;
use tracing::info;

use lounge_api::AppState;
use lounge_api::session::SessionStore;

/// Placeholder cookie secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string-of-at-least-64-bytes-before-deploying",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "lounge_server=debug,lounge_api=debug,lounge_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let cookie_secret = std::env::var("LOUNGE_COOKIE_SECRET").unwrap_or_default();
    if cookie_secret.len() < 64 || PLACEHOLDER_SECRETS.contains(&cookie_secret.as_str()) {
        eprintln!("FATAL: LOUNGE_COOKIE_SECRET is unset, shorter than 64 bytes, or still a placeholder.");
        eprintln!("       Session cookies are signed with this secret.");
        eprintln!("       Set it in your .env file and restart.");
        std::process::exit(1);
    }

    let db_path = std::env::var("LOUNGE_DB_PATH").unwrap_or_else(|_| "lounge.db".into());
    let host = std::env::var("LOUNGE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("LOUNGE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database — one long-lived handle, shared by all handlers
    let db = Arc::new(lounge_db::Database::open(&PathBuf::from(&db_path))?);

    let state = AppState {
        db,
        sessions: SessionStore::new(),
        cookie_key: Key::from(cookie_secret.as_bytes()),
    };

    let app = lounge_api::router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Lounge server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
