//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::fmt;

use platform::password::HashCost;
use platform::token::TokenConfig;
use secrecy::SecretString;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session token signing
    pub token: TokenConfig,
    /// Argon2id work factors for new hashes
    pub hash_cost: HashCost,
    /// Account ensured at startup
    pub default_admin: Option<DefaultAdmin>,
}

impl AuthConfig {
    pub fn new(token: TokenConfig) -> Self {
        Self {
            token,
            hash_cost: HashCost::default(),
            default_admin: None,
        }
    }

    pub fn with_hash_cost(mut self, hash_cost: HashCost) -> Self {
        self.hash_cost = hash_cost;
        self
    }

    pub fn with_default_admin(mut self, admin: DefaultAdmin) -> Self {
        self.default_admin = Some(admin);
        self
    }
}

/// Credentials for the bootstrap admin account
#[derive(Clone)]
pub struct DefaultAdmin {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

impl fmt::Debug for DefaultAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultAdmin")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
