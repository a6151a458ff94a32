//! Driving port for user-facing queries.

use async_trait::async_trait;

use crate::domain::{Caller, Error, Role, User};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Profile of the authenticated caller.
    async fn current_user(&self, caller: &Caller) -> Result<User, Error>;

    /// Staff accounts holding `role`. Admin only.
    async fn list_staff(&self, caller: &Caller, role: Role) -> Result<Vec<User>, Error>;
}
