pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod rate_limit;
pub mod session;

use api::create_api_router;
use auth::{AuthBackend, authenticate};
use axum::{Router, http::HeaderName, middleware};
use db::Database;
use jwt::{JwtConfig, JwtError};
use password::PasswordHasher;
use rate_limit::RateLimitConfig;
use session::{SessionConfig, SessionIssuer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Access and refresh token lifetimes
    pub session: SessionConfig,
    /// Whether to set Secure flag on cookies (should be true in production with HTTPS)
    pub secure_cookies: bool,
    /// Header holding the client IP (requires running behind a proxy)
    pub client_ip_header: Option<HeaderName>,
    /// Password hasher (bcrypt work factor)
    pub hasher: PasswordHasher,
    /// Rate limiters for the credential endpoints. Defaults are used when absent.
    pub rate_limit: Option<RateLimitConfig>,
}

/// Create the application router with the given configuration.
///
/// Fails when the signing key is unusable, so a misconfigured server never
/// starts accepting requests.
pub fn create_app(config: &ServerConfig) -> Result<Router, JwtError> {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret)?);

    let sessions = SessionIssuer::new(jwt.clone(), config.session);
    let rate_limit_config = Arc::new(
        config
            .rate_limit
            .clone()
            .unwrap_or_else(|| RateLimitConfig::new(config.client_ip_header.clone())),
    );

    let backend = AuthBackend {
        db: config.db.clone(),
        jwt,
        secure_cookies: config.secure_cookies,
    };

    let app = create_api_router(
        config.db.clone(),
        sessions,
        config.hasher,
        config.secure_cookies,
        rate_limit_config,
    )
    .layer(middleware::from_fn_with_state(
        backend,
        authenticate::<AuthBackend>,
    ));

    Ok(app)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config).map_err(std::io::Error::other)?;
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
