//! Authentication error types.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::cookie::clear_session_cookie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthErrorKind {
    /// No usable access token accompanied a request to a protected route.
    NotAuthenticated,
    /// A valid access token names an account that no longer exists.
    IdentityRevoked,
}

/// API authentication errors (JSON body, 401).
#[derive(Debug)]
pub struct ApiAuthError {
    kind: AuthErrorKind,
    secure_cookies: bool,
}

impl ApiAuthError {
    pub fn not_authenticated() -> Self {
        Self {
            kind: AuthErrorKind::NotAuthenticated,
            secure_cookies: false,
        }
    }

    pub fn identity_revoked(secure_cookies: bool) -> Self {
        Self {
            kind: AuthErrorKind::IdentityRevoked,
            secure_cookies,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NotAuthenticated => "Not authenticated",
            AuthErrorKind::IdentityRevoked => "User no longer exists",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        let mut response = (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response();

        // The cookie can never authenticate again once its account is gone
        if self.kind == AuthErrorKind::IdentityRevoked {
            if let Ok(value) = HeaderValue::from_str(&clear_session_cookie(self.secure_cookies)) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }

        response
    }
}
