//! Seed Admin Use Case
//!
//! Ensures the configured admin account exists. Safe to run on every start.

use std::sync::Arc;

use platform::password::{ClearTextPassword, PasswordHasher};
use secrecy::ExposeSecret;

use crate::application::config::DefaultAdmin;
use crate::application::hash_blocking;
use crate::domain::entity::user::NewUser;
use crate::domain::repository::{RepositoryScope, UnitOfWork, UserRepository};
use crate::domain::value_object::{UserId, email::Email, user_name::UserName, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(UserId),
    AlreadyPresent,
}

/// Seed admin use case
pub struct SeedAdminUseCase<U>
where
    U: UnitOfWork,
{
    uow: Arc<U>,
    hasher: Arc<PasswordHasher>,
}

impl<U> SeedAdminUseCase<U>
where
    U: UnitOfWork,
{
    pub fn new(uow: Arc<U>, hasher: Arc<PasswordHasher>) -> Self {
        Self { uow, hasher }
    }

    pub async fn execute(&self, admin: &DefaultAdmin) -> AuthResult<SeedOutcome> {
        let username = UserName::new(admin.username.as_str())?;
        let email = Email::new(&admin.email)?;

        match self
            .uow
            .user_repository()
            .find_by_username(username.as_str())
            .await
        {
            Ok(_) => return Ok(SeedOutcome::AlreadyPresent),
            Err(AuthError::UserNotFound) => {}
            Err(e) => return Err(e),
        }

        let password = ClearTextPassword::new(admin.password.expose_secret().to_owned())?;
        let password_hash = hash_blocking(&self.hasher, password).await?;

        let new_user = NewUser {
            username,
            email,
            password_hash,
            role: UserRole::Admin,
        };

        let created = self
            .uow
            .run(move |tx| Box::pin(async move { tx.user_repository().create(&new_user).await }))
            .await;

        match created {
            Ok(user) => {
                tracing::info!(
                    user_id = %user.user_id,
                    username = %user.username,
                    "Default admin created"
                );
                Ok(SeedOutcome::Created(user.user_id))
            }
            // Lost a race, or the name belongs to a soft-deleted account
            Err(e @ (AuthError::UsernameTaken | AuthError::EmailTaken)) => {
                tracing::info!(username = %admin.username, reason = %e, "Default admin not seeded");
                Ok(SeedOutcome::AlreadyPresent)
            }
            Err(e) => Err(e),
        }
    }
}
