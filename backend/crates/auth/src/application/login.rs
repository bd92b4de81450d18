//! Login Use Case
//!
//! Authenticates a user by username and password.

use std::sync::Arc;

use platform::password::{ClearTextPassword, PasswordHasher};
use platform::token::TokenSigner;

use crate::application::{AuthOutput, issue_session};
use crate::domain::repository::{UnitOfWork, UserRepository};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Login use case
///
/// Unknown users and wrong passwords fail identically, and both paths pay
/// for one Argon2 verification.
pub struct LoginUseCase<U>
where
    U: UnitOfWork,
{
    uow: Arc<U>,
    signer: Arc<TokenSigner>,
    hasher: Arc<PasswordHasher>,
}

impl<U> LoginUseCase<U>
where
    U: UnitOfWork,
{
    pub fn new(uow: Arc<U>, signer: Arc<TokenSigner>, hasher: Arc<PasswordHasher>) -> Self {
        Self {
            uow,
            signer,
            hasher,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<AuthOutput> {
        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let user = match self
            .uow
            .user_repository()
            .find_by_username(&input.username)
            .await
        {
            Ok(user) => Some(user),
            Err(AuthError::UserNotFound) => None,
            Err(e) => return Err(e),
        };

        let hasher = Arc::clone(&self.hasher);
        let stored = user.as_ref().map(|u| u.password_hash.clone());
        let verified =
            tokio::task::spawn_blocking(move || hasher.verify_or_dummy(&password, stored.as_ref()))
                .await?;

        let user = match user {
            Some(user) if verified => user,
            _ => {
                tracing::warn!(username = %input.username, "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
        };

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            "User logged in"
        );

        issue_session(&self.signer, &user)
    }
}
