//! Per-request authentication.
//!
//! Every request passes through [`authenticate`] before reaching a handler.
//! Unverifiable credentials and refresh tokens are ignored, leaving the
//! request anonymous so public routes stay reachable; protected handlers
//! reject anonymous requests through the [`Auth`](super::Auth) extractor.
//! A correctly signed access token whose subject has disappeared is
//! different: the request is stopped here with a 401.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use super::credential::extract_credential;
use super::errors::ApiAuthError;
use super::state::HasAuthBackend;
use super::types::{AuthContext, AuthOutcome};
use crate::identity::IdentityDirectory;
use crate::jwt::{JwtConfig, TokenType};

/// Decide what identity, if any, the request's credential establishes.
pub async fn authenticate_request<D: IdentityDirectory>(
    headers: &HeaderMap,
    jwt: &JwtConfig,
    directory: &D,
) -> AuthOutcome {
    let Some(token) = extract_credential(headers) else {
        return AuthOutcome::Anonymous;
    };

    let claims = match jwt.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Ignoring unverifiable credential");
            return AuthOutcome::Anonymous;
        }
    };

    if claims.token_type != TokenType::Access {
        debug!(token_type = %claims.token_type, "Ignoring non-access token");
        return AuthOutcome::Anonymous;
    }

    match directory.resolve(&claims.sub).await {
        Ok(Some(identity)) if identity.active => AuthOutcome::Authenticated(identity),
        Ok(Some(_)) => {
            warn!("Rejecting access token for inactive account");
            AuthOutcome::Rejected
        }
        Ok(None) => {
            warn!("Rejecting access token for deleted account");
            AuthOutcome::Rejected
        }
        Err(e) => {
            error!(error = %e, "Identity lookup failed");
            AuthOutcome::Rejected
        }
    }
}

/// Middleware attaching an [`AuthContext`] to each request, or halting it.
pub async fn authenticate<S>(State(state): State<S>, mut request: Request, next: Next) -> Response
where
    S: HasAuthBackend + Clone + Send + Sync + 'static,
{
    let context =
        match authenticate_request(request.headers(), state.jwt(), state.db()).await {
            AuthOutcome::Anonymous => AuthContext::Anonymous,
            AuthOutcome::Authenticated(identity) => AuthContext::Authenticated(identity),
            AuthOutcome::Rejected => {
                return ApiAuthError::identity_revoked(state.secure_cookies()).into_response();
            }
        };

    request.extensions_mut().insert(context);
    next.run(request).await
}
