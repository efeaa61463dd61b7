//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::jwt::DEFAULT_SESSION_TTL;
use crate::password::DEFAULT_BCRYPT_COST;
use clap::Parser;
use std::time::Duration;
use tracing::{error, info, warn};

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Longest accepted session lifetime: 365 days.
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "strength-tracker", about = "Workout tracker API server")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "strength-tracker.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Secret version stamped into tokens; bump when rotating the secret
    #[arg(long, env = "JWT_KEY_VERSION", default_value_t = 1)]
    pub jwt_key_version: u32,

    /// Session lifetime in seconds
    #[arg(
        long,
        env = "SESSION_TTL",
        default_value_t = DEFAULT_SESSION_TTL.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..=MAX_SESSION_TTL_SECS)
    )]
    pub session_ttl: u64,

    /// bcrypt cost factor for new password digests
    #[arg(long, env = "BCRYPT_COST", default_value_t = DEFAULT_BCRYPT_COST,
        value_parser = clap::value_parser!(u32).range(4..=31))]
    pub bcrypt_cost: u32,

    /// Production mode: session cookies get the Secure attribute
    #[arg(long, env = "STRENGTH_TRACKER_PRODUCTION")]
    pub production: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    check_jwt_secret(secret)
}

fn check_jwt_secret(secret: String) -> Option<String> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }
    Some(secret)
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> ServerConfig {
    if !args.production {
        warn!("Running without production mode, session cookies are not marked Secure");
    }

    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        jwt_key_version: args.jwt_key_version,
        session_ttl: Duration::from_secs(args.session_ttl),
        secure_cookies: args.production,
        bcrypt_cost: args.bcrypt_cost,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
