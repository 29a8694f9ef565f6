mod account;
mod auth;
mod error;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::password::PasswordHasher;
use crate::rate_limit::RateLimitConfig;
use crate::session::SessionIssuer;

pub use account::AccountState;
pub use auth::AuthState;
pub use error::ApiError;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    sessions: SessionIssuer,
    hasher: PasswordHasher,
    secure_cookies: bool,
    rate_limit_config: Arc<RateLimitConfig>,
) -> Router {
    let account_state = account::AccountState {
        db: db.clone(),
        hasher,
    };

    let auth_state = auth::AuthState {
        db,
        sessions,
        hasher,
        secure_cookies,
        rate_limit_config,
    };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/account", account::router(account_state))
}
