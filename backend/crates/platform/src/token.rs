//! Session Tokens
//!
//! Stateless HS256 JWTs carrying `{user_id, username, role, iat, exp}`.
//! The signer is built once from [`TokenConfig`]; there is no global key.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Longest accepted session window (366 days)
pub const MAX_EXPIRY_HOURS: i64 = 24 * 366;

/// Signing configuration
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: SecretString,
    pub expiry_hours: i64,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("expiry_hours", &self.expiry_hours)
            .finish()
    }
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: String,
    pub username: String,
    pub role: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token signing secret is not configured")]
    MissingSecret,

    #[error("token expiry must be a positive number of hours (got {0})")]
    InvalidExpiry(i64),

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("unexpected token signing algorithm {0:?}")]
    UnexpectedAlgorithm(Algorithm),

    #[error("token subject is not a valid user id")]
    InvalidSubject,

    #[error("malformed token")]
    Malformed(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Raised while building the signer rather than while checking a token
    pub fn is_configuration(&self) -> bool {
        matches!(self, TokenError::MissingSecret | TokenError::InvalidExpiry(_))
    }
}

/// Issues and validates session tokens
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenSigner {
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        let secret = config.secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(TokenError::MissingSecret);
        }

        if !(1..=MAX_EXPIRY_HOURS).contains(&config.expiry_hours) {
            return Err(TokenError::InvalidExpiry(config.expiry_hours));
        }
        let expiry = Duration::try_hours(config.expiry_hours)
            .ok_or(TokenError::InvalidExpiry(config.expiry_hours))?;

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn issue(&self, user_id: &str, username: &str, role: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    /// Issue as if the current time were `now`
    pub fn issue_at(
        &self,
        user_id: &str,
        username: &str,
        role: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now
            .checked_add_signed(self.expiry)
            .ok_or(TokenError::InvalidExpiry(self.expiry.num_hours()))?;

        let claims = SessionClaims {
            user_id: user_id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Check algorithm, signature and expiry, in that order
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        // The header is untrusted until the algorithm is pinned.
        let header = decode_header(token).map_err(TokenError::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::UnexpectedAlgorithm(header.alg));
        }

        decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::InvalidAlgorithm => TokenError::UnexpectedAlgorithm(header.alg),
                _ => TokenError::Malformed(e),
            })
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("algorithm", &ALGORITHM)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
