//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use platform::password::HashedPassword;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::{RepositoryScope, UnitOfWork, UserRepository};
use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};
use crate::infra::transaction::{TransactionScope, run_in_scope};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

// ============================================================================
// Unit of Work
// ============================================================================

/// PostgreSQL-backed unit of work
#[derive(Clone)]
pub struct PgUnitOfWork {
    users: PgUserRepository,
}

impl PgUnitOfWork {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: PgUserRepository { pool },
        }
    }
}

impl RepositoryScope for PgUnitOfWork {
    type Users = PgUserRepository;

    fn user_repository(&self) -> &PgUserRepository {
        &self.users
    }
}

impl UnitOfWork for PgUnitOfWork {
    type Transaction = PgTransaction;

    async fn run<T, F>(&self, f: F) -> AuthResult<T>
    where
        T: Send,
        F: for<'t> FnOnce(&'t Self::Transaction) -> BoxFuture<'t, AuthResult<T>> + Send,
    {
        let tx = self.users.pool.begin().await?;
        let scope = PgTransaction {
            users: PgTxUserRepository { tx: Mutex::new(tx) },
        };

        run_in_scope(scope, f).await
    }
}

/// Transaction scope handed to [`UnitOfWork::run`] callbacks
///
/// An un-finished `Transaction` rolls back when dropped, which covers
/// cancellation of the enclosing future.
pub struct PgTransaction {
    users: PgTxUserRepository,
}

impl RepositoryScope for PgTransaction {
    type Users = PgTxUserRepository;

    fn user_repository(&self) -> &PgTxUserRepository {
        &self.users
    }
}

impl TransactionScope for PgTransaction {
    async fn commit(self) -> AuthResult<()> {
        self.users.tx.into_inner().commit().await?;
        Ok(())
    }

    async fn rollback(self) -> AuthResult<()> {
        self.users.tx.into_inner().rollback().await?;
        Ok(())
    }
}

// ============================================================================
// User Repository Implementations
// ============================================================================

/// Repository bound to the pool
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl UserRepository for PgUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        queries::insert(&self.pool, user).await
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<User> {
        queries::find_by_username(&self.pool, username).await
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        queries::find_by_email(&self.pool, email).await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        queries::find_by_id(&self.pool, user_id).await
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        queries::update(&self.pool, user).await
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        queries::soft_delete(&self.pool, user_id).await
    }
}

/// Repository bound to an open transaction
///
/// The connection is behind a mutex because repository methods take `&self`;
/// calls inside one transaction are sequential anyway.
pub struct PgTxUserRepository {
    tx: Mutex<Transaction<'static, Postgres>>,
}

impl UserRepository for PgTxUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let mut tx = self.tx.lock().await;
        queries::insert(&mut **tx, user).await
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<User> {
        let mut tx = self.tx.lock().await;
        queries::find_by_username(&mut **tx, username).await
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<User> {
        let mut tx = self.tx.lock().await;
        queries::find_by_email(&mut **tx, email).await
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        let mut tx = self.tx.lock().await;
        queries::find_by_id(&mut **tx, user_id).await
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        let mut tx = self.tx.lock().await;
        queries::update(&mut **tx, user).await
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let mut tx = self.tx.lock().await;
        queries::soft_delete(&mut **tx, user_id).await
    }
}

// ============================================================================
// Queries
// ============================================================================

mod queries {
    use super::*;

    pub(super) async fn insert<'e, E: PgExecutor<'e>>(
        executor: E,
        user: &NewUser,
    ) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING
                user_id,
                username,
                email,
                password_hash,
                role,
                created_at,
                updated_at,
                deleted_at
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.code())
        .fetch_one(executor)
        .await
        .map_err(map_write_error)?;

        row.try_into()
    }

    pub(super) async fn find_by_username<'e, E: PgExecutor<'e>>(
        executor: E,
        username: &str,
    ) -> AuthResult<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                email,
                password_hash,
                role,
                created_at,
                updated_at,
                deleted_at
            FROM users
            WHERE username = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(username)
        .fetch_optional(executor)
        .await?
        .ok_or(AuthError::UserNotFound)?
        .try_into()
    }

    pub(super) async fn find_by_email<'e, E: PgExecutor<'e>>(
        executor: E,
        email: &str,
    ) -> AuthResult<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                email,
                password_hash,
                role,
                created_at,
                updated_at,
                deleted_at
            FROM users
            WHERE email = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(executor)
        .await?
        .ok_or(AuthError::UserNotFound)?
        .try_into()
    }

    pub(super) async fn find_by_id<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: &UserId,
    ) -> AuthResult<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                user_id,
                username,
                email,
                password_hash,
                role,
                created_at,
                updated_at,
                deleted_at
            FROM users
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(executor)
        .await?
        .ok_or(AuthError::UserNotFound)?
        .try_into()
    }

    pub(super) async fn update<'e, E: PgExecutor<'e>>(
        executor: E,
        user: &User,
    ) -> AuthResult<User> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                username = $2,
                email = $3,
                password_hash = $4,
                role = $5,
                updated_at = now()
            WHERE user_id = $1 AND deleted_at IS NULL
            RETURNING
                user_id,
                username,
                email,
                password_hash,
                role,
                created_at,
                updated_at,
                deleted_at
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.role.code())
        .fetch_optional(executor)
        .await
        .map_err(map_write_error)?
        .ok_or(AuthError::UserNotFound)?
        .try_into()
    }

    pub(super) async fn soft_delete<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: &UserId,
    ) -> AuthResult<()> {
        let affected = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = now(), updated_at = now()
            WHERE user_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(executor)
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

/// The store's unique constraints are the authoritative conflict signal
fn map_write_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => return AuthError::UsernameTaken,
                Some(EMAIL_CONSTRAINT) => return AuthError::EmailTaken,
                _ => {}
            }
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> AuthResult<User> {
        let password_hash = HashedPassword::from_phc_string(row.password_hash).map_err(|e| {
            AuthError::Internal(format!("stored hash for user {} is unusable: {e}", row.user_id))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(row.user_id),
            username: UserName::from_db(row.username),
            email: Email::from_db(row.email),
            password_hash,
            role: UserRole::from_code(&row.role),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}
