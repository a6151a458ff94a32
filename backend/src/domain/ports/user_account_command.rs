//! Driving port for account creation and profile maintenance.

use async_trait::async_trait;

use crate::domain::{
    Caller, Department, DisplayName, EmailAddress, Error, NewPassword, ProfileImage, Role, User,
};

/// Validated input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub email: EmailAddress,
    pub password: NewPassword,
    pub name: DisplayName,
    pub role: Role,
    pub department: Option<Department>,
}

/// Validated input for a self-service profile update.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateRequest {
    pub name: Option<DisplayName>,
    pub image: Option<ProfileImage>,
    pub password: Option<NewPassword>,
}

impl ProfileUpdateRequest {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none() && self.password.is_none()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserAccountCommand: Send + Sync {
    /// Create an account on behalf of an admin.
    async fn create_user(&self, caller: &Caller, request: CreateUserRequest)
    -> Result<User, Error>;

    /// Update the caller's own profile.
    async fn update_profile(
        &self,
        caller: &Caller,
        request: ProfileUpdateRequest,
    ) -> Result<User, Error>;

    /// Create the admin account unless one with the email already exists.
    ///
    /// Returns `true` when an account was created.
    async fn ensure_admin(
        &self,
        email: EmailAddress,
        password: NewPassword,
        name: DisplayName,
    ) -> Result<bool, Error>;
}
