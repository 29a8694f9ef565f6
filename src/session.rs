//! Session issuance: access/refresh token pairs at login and access-token
//! renewal from a refresh token.
//!
//! Refresh tokens are only ever minted at login, so their lifetime bounds how
//! long a user can go without re-entering credentials.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::identity::IdentityDirectory;
use crate::jwt::{IssuedToken, JwtConfig, JwtError, TokenType};

/// Default access token lifetime: 15 minutes
pub const DEFAULT_ACCESS_TOKEN_MINUTES: u64 = 15;

/// Default refresh token lifetime: 1 week
pub const DEFAULT_REFRESH_TOKEN_MINUTES: u64 = 7 * 24 * 60;

/// Longest accepted token lifetime: 10 years
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Token lifetimes. Construct through [`SessionConfig::new`] so the
/// access < refresh ordering always holds.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    access_ttl: Duration,
    refresh_ttl: Duration,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("token lifetimes must be at least one second")]
    ZeroLifetime,
    #[error(
        "access token lifetime ({access}s) must be shorter than refresh token lifetime ({refresh}s)"
    )]
    AccessNotShorter { access: u64, refresh: u64 },
    #[error("token lifetimes cannot exceed {max}s", max = MAX_TOKEN_LIFETIME.as_secs())]
    LifetimeTooLong,
}

impl SessionConfig {
    pub fn new(access_ttl: Duration, refresh_ttl: Duration) -> Result<Self, ConfigError> {
        if access_ttl.as_secs() == 0 || refresh_ttl.as_secs() == 0 {
            return Err(ConfigError::ZeroLifetime);
        }
        if access_ttl > MAX_TOKEN_LIFETIME || refresh_ttl > MAX_TOKEN_LIFETIME {
            return Err(ConfigError::LifetimeTooLong);
        }
        if access_ttl >= refresh_ttl {
            return Err(ConfigError::AccessNotShorter {
                access: access_ttl.as_secs(),
                refresh: refresh_ttl.as_secs(),
            });
        }
        Ok(Self {
            access_ttl,
            refresh_ttl,
        })
    }

    pub fn from_minutes(access: u64, refresh: u64) -> Result<Self, ConfigError> {
        let seconds = |minutes: u64| {
            minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or(ConfigError::LifetimeTooLong)
        };
        Self::new(seconds(access)?, seconds(refresh)?)
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_MINUTES * 60),
            refresh_ttl: Duration::from_secs(DEFAULT_REFRESH_TOKEN_MINUTES * 60),
        }
    }
}

/// Tokens handed out at login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Signing is impossible; a deployment problem, not a client one.
    #[error("{0}")]
    Configuration(JwtError),
    #[error("refresh token is invalid or expired")]
    InvalidToken,
    #[error("expected a {expected} token but got a {found} token")]
    WrongTokenType {
        expected: TokenType,
        found: TokenType,
    },
    #[error("user no longer exists")]
    IdentityNotFound,
}

impl SessionError {
    /// Whether this failure should be reported to the client as a 401.
    pub fn is_unauthenticated(&self) -> bool {
        !matches!(self, SessionError::Configuration(_))
    }
}

impl From<JwtError> for SessionError {
    fn from(e: JwtError) -> Self {
        match e {
            JwtError::Invalid(_) => SessionError::InvalidToken,
            JwtError::Configuration(_) => SessionError::Configuration(e),
        }
    }
}

/// Issues token pairs and renews access tokens.
#[derive(Clone)]
pub struct SessionIssuer {
    jwt: Arc<JwtConfig>,
    config: SessionConfig,
}

impl SessionIssuer {
    pub fn new(jwt: Arc<JwtConfig>, config: SessionConfig) -> Self {
        Self { jwt, config }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Issue an access token and a refresh token for the same subject.
    pub fn issue_pair(&self, subject: &str) -> Result<TokenPair, SessionError> {
        let access = self.issue_access(subject)?;
        let refresh = self
            .jwt
            .sign(subject, TokenType::Refresh, self.config.refresh_ttl)?;
        Ok(TokenPair { access, refresh })
    }

    fn issue_access(&self, subject: &str) -> Result<IssuedToken, SessionError> {
        Ok(self
            .jwt
            .sign(subject, TokenType::Access, self.config.access_ttl)?)
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token must verify, be refresh-typed, and name a subject the
    /// directory still knows. Never issues a new refresh token.
    pub async fn refresh_access<D: IdentityDirectory>(
        &self,
        refresh_token: &str,
        directory: &D,
    ) -> Result<IssuedToken, SessionError> {
        let claims = self.jwt.verify(refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(SessionError::WrongTokenType {
                expected: TokenType::Refresh,
                found: claims.token_type,
            });
        }

        let identity = match directory.resolve(&claims.sub).await {
            Ok(Some(identity)) if identity.active => identity,
            Ok(_) => return Err(SessionError::IdentityNotFound),
            Err(e) => {
                warn!(error = %e, "Identity lookup failed during refresh");
                return Err(SessionError::IdentityNotFound);
            }
        };

        self.issue_access(&identity.subject)
    }
}
