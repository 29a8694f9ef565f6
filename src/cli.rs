//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::password::PasswordHasher;
use crate::session::{DEFAULT_ACCESS_TOKEN_MINUTES, DEFAULT_REFRESH_TOKEN_MINUTES, SessionConfig};
use axum::http::HeaderName;
use clap::Parser;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "Rafalift",
    about = "Account and session service with JWT authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "RAFALIFT_PORT", default_value = "8080")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "RAFALIFT_DATABASE", default_value = "rafalift.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, default_value_t = DEFAULT_ACCESS_TOKEN_MINUTES)]
    pub access_token_minutes: u64,

    /// Refresh token lifetime in minutes (must exceed the access token lifetime)
    #[arg(long, default_value_t = DEFAULT_REFRESH_TOKEN_MINUTES)]
    pub refresh_token_minutes: u64,

    /// Set the Secure flag on cookies (use when served over HTTPS)
    #[arg(long)]
    pub secure_cookies: bool,

    /// Header carrying the client IP, e.g. "x-forwarded-for" (only behind a trusted proxy)
    #[arg(long, value_parser = parse_header_name)]
    pub client_ip_header: Option<HeaderName>,

    /// bcrypt work factor for password hashes
    #[arg(long, default_value_t = bcrypt::DEFAULT_COST, value_parser = clap::value_parser!(u32).range(4..=31))]
    pub bcrypt_cost: u32,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

fn parse_header_name(s: &str) -> Result<HeaderName, String> {
    HeaderName::try_from(s.trim()).map_err(|e| format!("Invalid header name '{}': {}", s, e))
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
        // SAFETY: called during startup before the runtime spawns worker
        // tasks; nothing else reads this variable.
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

    check_secret_length(secret)
}

fn check_secret_length(secret: String) -> Option<String> {
    if secret.chars().count() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }
    Some(secret)
}

/// Build ServerConfig from validated arguments.
/// Returns None and logs an error if the token lifetimes are inconsistent.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> Option<ServerConfig> {
    let session =
        match SessionConfig::from_minutes(args.access_token_minutes, args.refresh_token_minutes) {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Invalid token lifetimes");
                return None;
            }
        };

    Some(ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        session,
        secure_cookies: args.secure_cookies,
        client_ip_header: args.client_ip_header.clone(),
        hasher: PasswordHasher::new(args.bcrypt_cost),
        rate_limit: None,
    })
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
