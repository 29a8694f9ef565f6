//! Request-scoped authentication state.

use crate::identity::Identity;

/// What the authenticator established for one request. Stored in the
/// request's extensions, so it never outlives or crosses requests.
#[derive(Debug, Clone)]
pub enum AuthContext {
    Anonymous,
    Authenticated(Identity),
}

impl AuthContext {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated(identity) => Some(identity),
        }
    }
}

/// Result of running the authenticator over a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// No usable access token; continue without identity.
    Anonymous,
    /// Continue with this identity attached.
    Authenticated(Identity),
    /// A valid access token for a vanished account; halt with 401.
    Rejected,
}
