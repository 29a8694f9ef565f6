//! Locating the credential a request presents.

use axum::http::{HeaderMap, header};

use super::cookie::{JWT_COOKIE_NAME, get_cookie};

const BEARER_PREFIX: &str = "Bearer ";

/// Token from an `Authorization: Bearer <token>` header, if non-blank.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

/// The request's candidate token: the bearer header wins, then the `jwt` cookie.
pub fn extract_credential(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| {
        get_cookie(headers, JWT_COOKIE_NAME).filter(|token| !token.is_empty())
    })
}
