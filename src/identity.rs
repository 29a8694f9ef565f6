//! Authenticated identity and the directory that resolves token subjects.

use std::future::Future;

use serde::Serialize;

use crate::db::UserRole;

/// An account as seen by authentication and authorization checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Database user ID
    pub user_id: i64,
    /// Token subject (the account email)
    pub subject: String,
    /// Display name
    pub name: String,
    pub role: UserRole,
    /// Inactive identities never authenticate
    pub active: bool,
}

impl Identity {
    /// Roles granted to this identity. Admins also hold the user role.
    pub fn roles(&self) -> &'static [UserRole] {
        match self.role {
            UserRole::Admin => &[UserRole::Admin, UserRole::User],
            UserRole::User => &[UserRole::User],
        }
    }

    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles().contains(&role)
    }
}

/// Failure of the directory itself (as opposed to an unknown subject).
#[derive(Debug, thiserror::Error)]
#[error("identity lookup failed: {0}")]
pub struct DirectoryError(pub String);

impl From<sqlx::Error> for DirectoryError {
    fn from(e: sqlx::Error) -> Self {
        Self(e.to_string())
    }
}

/// Maps a token subject to a live account.
pub trait IdentityDirectory: Send + Sync {
    /// Resolve `subject`, returning `Ok(None)` when no such account exists.
    fn resolve(
        &self,
        subject: &str,
    ) -> impl Future<Output = Result<Option<Identity>, DirectoryError>> + Send;
}
