//! Axum extractors for authentication.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::errors::ApiAuthError;
use super::types::AuthContext;
use crate::identity::Identity;

fn identity_from(parts: &Parts) -> Option<Identity> {
    parts
        .extensions
        .get::<AuthContext>()
        .and_then(AuthContext::identity)
        .cloned()
}

/// Extractor for API endpoints that require authentication.
/// Reads the identity established by the authenticator middleware.
pub struct Auth(pub Identity);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from(parts)
            .map(Auth)
            .ok_or_else(ApiAuthError::not_authenticated)
    }
}

/// Optional authentication extractor - never fails.
/// Useful for endpoints that work both authenticated and unauthenticated.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(identity_from(parts)))
    }
}
