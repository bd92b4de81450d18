//! In-memory store
//!
//! Same contract as the PostgreSQL backend, for local runs and tests.
//! A transaction holds the table lock for its whole lifetime and works on a
//! staged copy, so transactions are fully serialized and a rollback simply
//! discards the copy.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures::future::BoxFuture;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::{RepositoryScope, UnitOfWork, UserRepository};
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};
use crate::infra::transaction::{TransactionScope, run_in_scope};

// ============================================================================
// Table
// ============================================================================

/// Uniqueness spans soft-deleted rows, mirroring the SQL constraints.
#[derive(Debug, Clone, Default)]
struct UserTable {
    rows: HashMap<UserId, User>,
}

impl UserTable {
    /// Username is checked before email, like the constraint order in SQL.
    fn check_unique(&self, username: &str, email: &str, except: Option<&UserId>) -> AuthResult<()> {
        if self.others(except).any(|row| row.username.as_str() == username) {
            return Err(AuthError::UsernameTaken);
        }
        if self.others(except).any(|row| row.email.as_str() == email) {
            return Err(AuthError::EmailTaken);
        }
        Ok(())
    }

    /// Every row, deleted or not, except `skip`
    fn others<'a>(&'a self, skip: Option<&'a UserId>) -> impl Iterator<Item = &'a User> + 'a {
        self.rows
            .values()
            .filter(move |row| Some(&row.user_id) != skip)
    }

    fn insert(&mut self, new: &NewUser) -> AuthResult<User> {
        self.check_unique(new.username.as_str(), new.email.as_str(), None)?;

        let now = Utc::now();
        let user = User {
            user_id: UserId::new(),
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            role: new.role.clone(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.rows.insert(user.user_id, user.clone());
        Ok(user)
    }

    fn find(&self, predicate: impl Fn(&User) -> bool) -> AuthResult<User> {
        self.rows
            .values()
            .find(|row| !row.is_deleted() && predicate(row))
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    fn live_mut(&mut self, user_id: &UserId) -> AuthResult<&mut User> {
        self.rows
            .get_mut(user_id)
            .filter(|row| !row.is_deleted())
            .ok_or(AuthError::UserNotFound)
    }

    fn update(&mut self, user: &User) -> AuthResult<User> {
        self.live_mut(&user.user_id)?;
        self.check_unique(user.username.as_str(), user.email.as_str(), Some(&user.user_id))?;

        let row = self.live_mut(&user.user_id)?;
        row.username = user.username.clone();
        row.email = user.email.clone();
        row.password_hash = user.password_hash.clone();
        row.role = user.role.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    fn soft_delete(&mut self, user_id: &UserId) -> AuthResult<()> {
        let row = self.live_mut(user_id)?;
        let now = Utc::now();
        row.deleted_at = Some(now);
        row.updated_at = now;
        Ok(())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ============================================================================
// Unit of Work
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryUnitOfWork {
    users: MemoryUserRepository,
}

impl MemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryScope for MemoryUnitOfWork {
    type Users = MemoryUserRepository;

    fn user_repository(&self) -> &MemoryUserRepository {
        &self.users
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    type Transaction = MemoryTransaction;

    async fn run<T, F>(&self, f: F) -> AuthResult<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t Self::Transaction) -> BoxFuture<'t, AuthResult<T>> + Send,
    {
        let guard = self.users.table.clone().lock_owned().await;
        let staged = (*guard).clone();
        let scope = MemoryTransaction {
            users: MemoryTxUserRepository {
                staged: Mutex::new(staged),
            },
            guard,
        };

        run_in_scope(scope, f).await
    }
}

/// Transaction scope handed to [`UnitOfWork::run`] callbacks
pub struct MemoryTransaction {
    users: MemoryTxUserRepository,
    guard: OwnedMutexGuard<UserTable>,
}

impl RepositoryScope for MemoryTransaction {
    type Users = MemoryTxUserRepository;

    fn user_repository(&self) -> &MemoryTxUserRepository {
        &self.users
    }
}

impl TransactionScope for MemoryTransaction {
    async fn commit(self) -> AuthResult<()> {
        let MemoryTransaction { users, mut guard } = self;
        *guard = users.staged.into_inner();
        Ok(())
    }

    async fn rollback(self) -> AuthResult<()> {
        Ok(())
    }
}

// ============================================================================
// User Repository Implementations
// ============================================================================

#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    table: Arc<Mutex<UserTable>>,
}

impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        self.table.lock().await.insert(user)
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<User> {
        self.table
            .lock()
            .await
            .find(|row| row.username.as_str() == username)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        self.table
            .lock()
            .await
            .find(|row| row.email.as_str() == email)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        self.table.lock().await.find(|row| row.user_id == *user_id)
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        self.table.lock().await.update(user)
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        self.table.lock().await.soft_delete(user_id)
    }
}

pub struct MemoryTxUserRepository {
    staged: Mutex<UserTable>,
}

impl UserRepository for MemoryTxUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        self.staged.lock().await.insert(user)
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<User> {
        self.staged
            .lock()
            .await
            .find(|row| row.username.as_str() == username)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        let email = normalize_email(email);
        self.staged
            .lock()
            .await
            .find(|row| row.email.as_str() == email)
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        self.staged.lock().await.find(|row| row.user_id == *user_id)
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        self.staged.lock().await.update(user)
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        self.staged.lock().await.soft_delete(user_id)
    }
}
