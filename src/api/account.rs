//! Account API endpoints for the signed-in user.
//!
//! - GET `/` - Current profile
//! - PUT `/name` - Rename
//! - PUT `/password` - Change password (requires the current one)
//! - DELETE `/` - Delete the account (requires the password)

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ApiError, ResultExt, validate_name};
use crate::auth::Auth;
use crate::db::{Database, User, UserRole};
use crate::identity::Identity;
use crate::password::{PasswordHasher, validate_password};

#[derive(Clone)]
pub struct AccountState {
    pub db: Database,
    pub hasher: PasswordHasher,
}

pub fn router(state: AccountState) -> Router {
    Router::new()
        .route("/", get(get_account).delete(delete_account))
        .route("/name", put(update_name))
        .route("/password", put(update_password))
        .with_state(state)
}

#[derive(Serialize)]
struct AccountResponse {
    id: i64,
    name: String,
    email: String,
    role: UserRole,
    roles: &'static [UserRole],
    created_at: String,
    updated_at: String,
}

impl From<User> for AccountResponse {
    fn from(user: User) -> Self {
        let roles = Identity::from(user.clone()).roles();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Load the stored user behind an authenticated identity.
async fn current_user(db: &Database, identity: &Identity) -> Result<User, ApiError> {
    db.users()
        .get_by_id(identity.user_id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized("User not found"))
}

async fn get_account(
    State(state): State<AccountState>,
    Auth(identity): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&state.db, &identity).await?;
    Ok(Json(AccountResponse::from(user)))
}

#[derive(Deserialize)]
struct UpdateNameRequest {
    #[serde(alias = "newName")]
    new_name: String,
}

async fn update_name(
    State(state): State<AccountState>,
    Auth(identity): Auth,
    Json(payload): Json<UpdateNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = validate_name(&payload.new_name)?;

    let updated = state
        .db
        .users()
        .update_name(identity.user_id, name)
        .await
        .db_err("Failed to update name")?;
    if !updated {
        return Err(ApiError::unauthorized("User not found"));
    }

    let user = current_user(&state.db, &identity).await?;
    Ok(Json(AccountResponse::from(user)))
}

#[derive(Deserialize)]
struct UpdatePasswordRequest {
    #[serde(alias = "currentPassword")]
    current_password: String,
    #[serde(alias = "newPassword")]
    new_password: String,
}

async fn update_password(
    State(state): State<AccountState>,
    Auth(identity): Auth,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&state.db, &identity).await?;

    if !state
        .hasher
        .verify_async(payload.current_password, user.password_hash.clone())
        .await
    {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }
    validate_password(&payload.new_password).map_err(ApiError::bad_request)?;

    let password_hash = state.hasher.hash_async(payload.new_password).await?;
    state
        .db
        .users()
        .update_password(user.id, &password_hash)
        .await
        .db_err("Failed to update password")?;

    info!(user_id = user.id, "Password changed");

    let user = current_user(&state.db, &identity).await?;
    Ok(Json(AccountResponse::from(user)))
}

#[derive(Deserialize)]
struct DeleteAccountRequest {
    password: String,
}

#[derive(Serialize)]
struct DeleteAccountResponse {
    deleted: bool,
}

async fn delete_account(
    State(state): State<AccountState>,
    Auth(identity): Auth,
    Json(payload): Json<DeleteAccountRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = current_user(&state.db, &identity).await?;

    if !state
        .hasher
        .verify_async(payload.password, user.password_hash.clone())
        .await
    {
        return Err(ApiError::bad_request("Password is incorrect"));
    }

    state
        .db
        .users()
        .delete(user.id)
        .await
        .db_err("Failed to delete user")?;

    info!(user_id = user.id, "Account deleted");

    Ok(Json(DeleteAccountResponse { deleted: true }))
}
