//! User Entity
//!
//! The only persisted entity of the auth domain.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{
    UserId, email::Email, user_name::UserName, user_role::UserRole,
};

/// Stored account
///
/// `password_hash` never leaves the service; use [`User::view`] for anything
/// that is sent to a client.
#[derive(Debug, Clone)]
pub struct User {
    /// Assigned by the store on creation
    pub user_id: UserId,
    pub username: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn view(&self) -> UserView {
        UserView {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Account about to be inserted; id and timestamps come from the store
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: UserName,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub role: UserRole,
}

/// Client-safe projection of [`User`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserView {
    pub user_id: UserId,
    pub username: UserName,
    pub email: Email,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
