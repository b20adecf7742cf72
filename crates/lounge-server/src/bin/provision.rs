//! Out-of-band user provisioning. Users are never created through the
//! live server — an operator runs this against the database directly:
//!
//! ```bash
//! lounge-provision alice --password hunter22
//! lounge-provision root --password s3cret --admin
//! ```

use std::path::PathBuf;

use anyhow::{Context, bail};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};
use clap::Parser;
use uuid::Uuid;

use lounge_db::Database;

/// Create a lounge user.
#[derive(Parser)]
#[command(name = "lounge-provision")]
#[command(about = "Provision a lounge user", long_about = None)]
struct Cli {
    /// Username (unique, case-sensitive)
    username: String,

    /// Password for the new user
    #[arg(short, long)]
    password: String,

    /// Grant the admin role
    #[arg(long)]
    admin: bool,

    /// Database path; falls back to LOUNGE_DB_PATH, then lounge.db
    #[arg(long)]
    db_path: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    if cli.username.trim().is_empty() {
        bail!("username must not be empty");
    }
    if cli.password.is_empty() {
        bail!("password must not be empty");
    }

    let db_path = cli
        .db_path
        .or_else(|| std::env::var_os("LOUNGE_DB_PATH").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("lounge.db"));

    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(cli.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();

    let user_id = Uuid::new_v4();

    db.create_user(&user_id.to_string(), &cli.username, &password_hash, cli.admin)
        .with_context(|| format!("failed to create user '{}'", cli.username))?;

    println!(
        "created user {} ({}){}",
        cli.username,
        user_id,
        if cli.admin { " [admin]" } else { "" }
    );

    Ok(())
}
