//! Authentication API endpoints.
//!
//! - POST `/register` - Create an account with a bcrypt-hashed password
//! - POST `/login` - Exchange credentials for an access/refresh token pair
//! - POST `/logout` - Clear the session cookie
//! - GET `/check` - 200 when the request carries a usable access token
//! - GET `/validate` - Like `/check`, but re-reads the account
//! - POST `/refresh` - Exchange a refresh token for a new access token

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::error::{ApiError, ResultExt, validate_email, validate_name};
use crate::auth::{Auth, OptionalAuth, bearer_token, clear_session_cookie, session_cookie};
use crate::db::{Database, UserRole};
use crate::password::{PasswordHasher, validate_password};
use crate::rate_limit::{RateLimitConfig, rate_limit_login, rate_limit_register};
use crate::session::SessionIssuer;

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub sessions: SessionIssuer,
    pub hasher: PasswordHasher,
    pub secure_cookies: bool,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

pub fn router(state: AuthState) -> Router {
    let register_router = Router::new()
        .route("/register", post(register))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_register,
        ));

    let login_router = Router::new()
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_login,
        ));

    let session_router = Router::new()
        .route("/logout", post(logout))
        .route("/check", get(check))
        .route("/validate", get(validate))
        .route("/refresh", post(refresh))
        .with_state(state);

    Router::new()
        .merge(register_router)
        .merge(login_router)
        .merge(session_router)
}

#[derive(Deserialize)]
struct RegisterRequest {
    #[serde(alias = "nome")]
    name: String,
    email: String,
    #[serde(alias = "senha")]
    password: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    id: i64,
    name: String,
    email: String,
}

async fn register(
    State(state): State<AuthState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&payload.name)?;
    let email = validate_email(&payload.email)?;
    validate_password(&payload.password).map_err(ApiError::bad_request)?;

    let users = state.db.users();
    if users
        .exists_by_email(&email)
        .await
        .db_err("Failed to check email")?
    {
        return Err(ApiError::bad_request("Email is already registered"));
    }

    let password_hash = state.hasher.hash_async(payload.password.clone()).await?;

    let id = match users
        .create(name, &email, &password_hash, UserRole::User)
        .await
    {
        Ok(id) => id,
        // Lost a race against a concurrent registration
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(ApiError::bad_request("Email is already registered"));
        }
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    info!(user_id = id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id,
            name: name.to_string(),
            email,
        }),
    ))
}

#[derive(Deserialize)]
struct LoginRequest {
    login: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    const BAD_CREDENTIALS: &str = "Invalid email or password";

    let email = payload.login.trim().to_lowercase();
    let user = state
        .db
        .users()
        .get_by_email(&email)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    if !state
        .hasher
        .verify_async(payload.password, user.password_hash.clone())
        .await
    {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let pair = state.sessions.issue_pair(&user.email)?;
    let cookie = session_cookie(
        &pair.access.token,
        pair.access.duration,
        state.secure_cookies,
    );

    info!(user_id = user.id, "User logged in");

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: pair.access.token,
            refresh_token: pair.refresh.token,
        }),
    ))
}

/// Clear the session cookie. Tokens are stateless, so nothing is revoked
/// server-side; an access token stays valid until it expires.
async fn logout(
    State(state): State<AuthState>,
    OptionalAuth(identity): OptionalAuth,
) -> impl IntoResponse {
    if let Some(identity) = identity {
        info!(user_id = identity.user_id, "User logged out");
    }
    (
        [(SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        StatusCode::OK,
    )
}

async fn check(Auth(_identity): Auth) -> impl IntoResponse {
    StatusCode::OK
}

async fn validate(
    State(state): State<AuthState>,
    Auth(identity): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let exists = state
        .db
        .users()
        .exists_by_email(&identity.subject)
        .await
        .db_err("Failed to check user")?;

    if !exists {
        return Err(ApiError::unauthorized("User not found"));
    }
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
struct RefreshRequest {
    refresh_token: Option<String>,
}

#[derive(Serialize)]
struct RefreshResponse {
    access_token: String,
}

/// Read the refresh token from the bearer header, falling back to a JSON body.
fn refresh_token_from(headers: &HeaderMap, body: &[u8]) -> Result<String, ApiError> {
    if let Some(token) = bearer_token(headers) {
        return Ok(token.to_string());
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::bad_request("Refresh token is required"));
    }

    let request: RefreshRequest = serde_json::from_slice(body)
        .map_err(|_| ApiError::bad_request("Request body must be JSON"))?;

    request
        .refresh_token
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::bad_request("Refresh token is required"))
}

async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let token = refresh_token_from(&headers, &body)?;

    let access = state.sessions.refresh_access(&token, &state.db).await?;
    let cookie = session_cookie(&access.token, access.duration, state.secure_cookies);

    Ok((
        [(SET_COOKIE, cookie)],
        Json(RefreshResponse {
            access_token: access.token,
        }),
    ))
}
