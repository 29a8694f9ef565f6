//! JWT authentication for API routes.
//!
//! Stateless dual-token system: short-lived access tokens authenticate
//! requests (from an `Authorization: Bearer` header or the `jwt` cookie);
//! long-lived refresh tokens are only accepted by the refresh endpoint.

mod authenticator;
mod cookie;
mod credential;
mod errors;
mod extractors;
mod ip;
mod state;
mod types;

pub use authenticator::{authenticate, authenticate_request};
pub use cookie::{JWT_COOKIE_NAME, clear_session_cookie, get_cookie, session_cookie};
pub use credential::{bearer_token, extract_credential};
pub use errors::ApiAuthError;
pub use extractors::{Auth, OptionalAuth};
pub use ip::extract_client_ip;
pub use state::{AuthBackend, HasAuthBackend};
pub use types::{AuthContext, AuthOutcome};
