//! Rate limiting for credential endpoints.
//!
//! Uses a token bucket algorithm with per-IP tracking to slow down password
//! guessing and signup spam.

use axum::{
    extract::{Request, State},
    http::{HeaderName, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{num::NonZeroU32, sync::Arc};
use tracing::warn;

use crate::auth::extract_client_ip;

/// Per-IP rate limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rate limiting configuration for credential endpoints.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Per-IP limiter for login (1 per second, bursts of 5)
    pub login: Arc<IpLimiter>,
    /// Per-IP limiter for registration (3 per minute)
    pub register: Arc<IpLimiter>,
    /// Header holding the client IP when running behind a proxy
    pub ip_header: Option<HeaderName>,
}

impl RateLimitConfig {
    /// Create rate limiters with default quotas.
    pub fn new(ip_header: Option<HeaderName>) -> Self {
        const LOGIN_PER_SEC: NonZeroU32 = NonZeroU32::new(1).unwrap();
        const LOGIN_BURST: NonZeroU32 = NonZeroU32::new(5).unwrap();
        const REGISTER_PER_MIN: NonZeroU32 = NonZeroU32::new(3).unwrap();

        Self::with_quotas(
            Quota::per_second(LOGIN_PER_SEC).allow_burst(LOGIN_BURST),
            Quota::per_minute(REGISTER_PER_MIN),
            ip_header,
        )
    }

    pub fn with_quotas(login: Quota, register: Quota, ip_header: Option<HeaderName>) -> Self {
        Self {
            login: Arc::new(RateLimiter::keyed(login)),
            register: Arc::new(RateLimiter::keyed(register)),
            ip_header,
        }
    }
}

fn check(limiter: &IpLimiter, ip_header: Option<&HeaderName>, request: &Request) -> Option<Response> {
    let ip = match extract_client_ip(request, ip_header) {
        Ok(ip) => ip,
        Err(reason) => {
            warn!(reason, "Unable to determine client IP");
            return Some((StatusCode::FORBIDDEN, "Unable to determine client IP.").into_response());
        }
    };

    match limiter.check_key(&ip) {
        Ok(_) => None,
        Err(_) => Some(
            (
                StatusCode::TOO_MANY_REQUESTS,
                "Too many attempts. Please wait before trying again.",
            )
                .into_response(),
        ),
    }
}

/// Middleware for rate limiting login.
pub async fn rate_limit_login(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match check(&config.login, config.ip_header.as_ref(), &request) {
        Some(rejection) => rejection,
        None => next.run(request).await,
    }
}

/// Middleware for rate limiting user registration.
pub async fn rate_limit_register(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match check(&config.register, config.ip_header.as_ref(), &request) {
        Some(rejection) => rejection,
        None => next.run(request).await,
    }
}
