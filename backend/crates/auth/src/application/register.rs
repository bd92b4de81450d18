//! Register Use Case
//!
//! Creates a new user account and signs a session token for it.

use std::sync::Arc;

use platform::password::{ClearTextPassword, PasswordHasher};
use platform::token::TokenSigner;

use crate::application::{AuthOutput, ensure_absent, hash_blocking, issue_session};
use crate::domain::entity::user::NewUser;
use crate::domain::repository::{RepositoryScope, UnitOfWork, UserRepository};
use crate::domain::value_object::{email::Email, user_name::UserName, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UnitOfWork,
{
    uow: Arc<U>,
    signer: Arc<TokenSigner>,
    hasher: Arc<PasswordHasher>,
}

impl<U> RegisterUseCase<U>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<AuthOutput> {
        let username = UserName::new(input.username)?;
        let email = Email::new(&input.email)?;

        // Early, friendly conflicts; the unique constraints still decide races
        let users = self.uow.user_repository();
        ensure_absent(
            users.find_by_username(username.as_str()).await,
            AuthError::UsernameTaken,
        )?;
        ensure_absent(users.find_by_email(email.as_str()).await, AuthError::EmailTaken)?;

        let password = ClearTextPassword::new(input.password)?;
        let password_hash = hash_blocking(&self.hasher, password).await?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
            role: UserRole::User,
        };

        let user = self
            .uow
            .run(move |tx| Box::pin(async move { tx.user_repository().create(&new_user).await }))
            .await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            "User registered"
        );

        issue_session(&self.signer, &user)
    }
}
