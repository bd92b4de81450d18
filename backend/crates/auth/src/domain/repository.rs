//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use std::future::Future;

pub use futures::future::BoxFuture;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::value_object::UserId;
use crate::error::AuthResult;

/// User repository trait
///
/// Lookups never return soft-deleted rows. A miss is
/// [`AuthError::UserNotFound`](crate::error::AuthError::UserNotFound), so
/// callers decide what "absent" means for them.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user. Unique violations surface as
    /// `UsernameTaken` / `EmailTaken`.
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    /// Case-sensitive match on the username
    async fn find_by_username(&self, username: &str) -> AuthResult<User>;

    async fn find_by_email(&self, email: &str) -> AuthResult<User>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<User>;

    /// Persist username, email, password hash and role of an existing user
    async fn update(&self, user: &User) -> AuthResult<User>;

    /// Soft delete
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;
}

/// A connection or transaction scope that hands out repositories
pub trait RepositoryScope {
    type Users: UserRepository + Sync;

    fn user_repository(&self) -> &Self::Users;
}

/// Transaction boundary for repository operations
///
/// Outside [`run`](UnitOfWork::run), [`RepositoryScope::user_repository`]
/// talks to the store directly. Inside, the callback receives a
/// transaction-scoped [`RepositoryScope`] that is only borrowed for the
/// lifetime of the callback's future.
///
/// The transaction scope is not itself a `UnitOfWork`, so nesting `run` does
/// not type-check.
pub trait UnitOfWork: RepositoryScope + Send + Sync + 'static {
    type Transaction: RepositoryScope + Send + Sync;

    /// Run `f` inside one transaction.
    ///
    /// - `Ok` commits; a failed commit is returned as an error.
    /// - `Err(e)` rolls back and returns `e` unchanged, or
    ///   `RollbackFailed` wrapping `e` if the rollback itself failed.
    /// - A panic rolls back and then resumes unwinding.
    /// - Dropping the returned future before completion rolls back.
    ///
    /// The callback captures by value:
    ///
    /// ```ignore
    /// let created = uow
    ///     .run(move |tx| Box::pin(async move { tx.user_repository().create(&new_user).await }))
    ///     .await?;
    /// ```
    fn run<T, F>(&self, f: F) -> impl Future<Output = AuthResult<T>> + Send
    where
        T: Send,
        F: for<'t> FnOnce(&'t Self::Transaction) -> BoxFuture<'t, AuthResult<T>> + Send;
}
