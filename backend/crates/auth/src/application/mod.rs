//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod get_profile;
pub mod login;
pub mod register;
pub mod seed_admin;

use std::sync::Arc;

use platform::password::{ClearTextPassword, HashedPassword, PasswordHasher};
use platform::token::TokenSigner;

use crate::domain::entity::user::{User, UserView};
use crate::error::{AuthError, AuthResult};

// Re-exports
pub use config::{AuthConfig, DefaultAdmin};
pub use get_profile::GetProfileUseCase;
pub use login::{LoginInput, LoginUseCase};
pub use register::{RegisterInput, RegisterUseCase};
pub use seed_admin::{SeedAdminUseCase, SeedOutcome};

/// Result of a successful register or login
#[derive(Debug, Clone)]
pub struct AuthOutput {
    pub token: String,
    pub user: UserView,
}

/// Sign a session token for `user`
fn issue_session(signer: &TokenSigner, user: &User) -> AuthResult<AuthOutput> {
    let token = signer.issue(
        &user.user_id.to_string(),
        user.username.as_str(),
        user.role.code(),
    )?;

    Ok(AuthOutput {
        token,
        user: user.view(),
    })
}

/// Argon2 is CPU-bound; keep it off the async workers
async fn hash_blocking(
    hasher: &Arc<PasswordHasher>,
    password: ClearTextPassword,
) -> AuthResult<HashedPassword> {
    let hasher = Arc::clone(hasher);
    let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
    Ok(hashed)
}

/// Map a lookup result to "is the value free to take"
fn ensure_absent(lookup: AuthResult<User>, taken: AuthError) -> AuthResult<()> {
    match lookup {
        Ok(_) => Err(taken),
        Err(AuthError::UserNotFound) => Ok(()),
        Err(e) => Err(e),
    }
}
