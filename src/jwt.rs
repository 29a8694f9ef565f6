//! JWT token generation and validation.
//!
//! Tokens are HS256-signed, carry a fixed issuer and a mandatory `type`
//! claim, and are never stored server-side.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Issuer stamped on every token and required on verification.
pub const ISSUER: &str = "auth-api";

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token that authenticates ordinary API requests
    Access,
    /// Long-lived token that can only mint new access tokens
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer, always [`ISSUER`]
    pub iss: String,
    /// Subject (user email)
    pub sub: String,
    /// Token type
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::Configuration("signing secret is empty".into()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // Expiry is checked against the caller's clock in `verify_at`
        validation.validate_exp = false;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Sign a token for `subject` that expires `ttl` from now.
    pub fn sign(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<IssuedToken, JwtError> {
        self.sign_at(subject, token_type, ttl, unix_now()?)
    }

    /// Sign a token as if the current time were `now` (Unix seconds).
    pub fn sign_at(
        &self,
        subject: &str,
        token_type: TokenType,
        ttl: Duration,
        now: u64,
    ) -> Result<IssuedToken, JwtError> {
        let duration = ttl.as_secs();
        if duration == 0 {
            return Err(JwtError::Configuration(
                "token lifetime must be at least one second".into(),
            ));
        }

        let exp = now.checked_add(duration).ok_or_else(|| {
            JwtError::Configuration("token expiry overflows the clock".into())
        })?;

        let claims = Claims {
            iss: ISSUER.to_string(),
            sub: subject.to_string(),
            token_type,
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Configuration(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
            duration,
        })
    }

    /// Validate signature, issuer and expiration, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, unix_now()?)
    }

    /// Validate a token as if the current time were `now` (Unix seconds).
    /// A token is expired from the instant `now == exp`.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims, JwtError> {
        let token_data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
                .map_err(|e| JwtError::Invalid(e.to_string()))?;

        if now >= token_data.claims.exp {
            return Err(JwtError::Invalid("token expired".into()));
        }

        Ok(token_data.claims)
    }
}

fn unix_now() -> Result<u64, JwtError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| JwtError::Configuration("system clock is before the Unix epoch".into()))
}

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// The signing key or clock is unusable; not recoverable per request.
    #[error("token signing misconfigured: {0}")]
    Configuration(String),
    /// Bad signature, wrong issuer, malformed payload or expired.
    #[error("token rejected: {0}")]
    Invalid(String),
}
