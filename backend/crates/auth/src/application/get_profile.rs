//! Get Profile Use Case

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::{UnitOfWork, UserRepository};
use crate::domain::value_object::UserId;
use crate::error::AuthResult;

/// Loads the current user; soft-deleted accounts are not found
pub struct GetProfileUseCase<U>
where
    U: UnitOfWork,
{
    uow: Arc<U>,
}

impl<U> GetProfileUseCase<U>
where
    U: UnitOfWork,
{
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    pub async fn execute(&self, user_id: &UserId) -> AuthResult<User> {
        self.uow.user_repository().find_by_id(user_id).await
    }
}
