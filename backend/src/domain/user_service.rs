//! User account services.
//!
//! [`UserAccountService`] implements login, account creation, profile
//! maintenance and staff listings over the user store and password hasher.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::access::{Operation, authorize};
use crate::domain::ports::{
    CreateUserRequest, LoginService, PasswordHashError, PasswordHasher, ProfileChanges,
    ProfileUpdateRequest, UserAccountCommand, UserPersistenceError, UserRepository, UsersQuery,
};
use crate::domain::{
    Caller, DisplayName, EmailAddress, Error, LoginCredentials, NewPassword, Role, User,
    UserDraft, UserId,
};

const INVALID_CREDENTIALS: &str = "invalid email or password";

pub(crate) fn map_user_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::conflict(format!("an account already uses {email}"))
        }
    }
}

fn map_hash_error(error: PasswordHashError) -> Error {
    error!(error = %error, "password hashing failed");
    Error::internal(error.to_string())
}

/// User service implementing [`LoginService`], [`UserAccountCommand`] and
/// [`UsersQuery`].
#[derive(Clone)]
pub struct UserAccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> UserAccountService<U, H> {
    /// Create a service over the user store and password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

impl<U, H> UserAccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, request: CreateUserRequest) -> Result<User, Error> {
        let CreateUserRequest {
            email,
            password,
            name,
            role,
            department,
        } = request;
        let now = self.clock.utc();
        let user = User::try_new(UserDraft {
            id: UserId::random(),
            email,
            name,
            role,
            department,
            image: None,
            created_at: now,
            updated_at: now,
        })
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        let hash = self.hasher.hash(&password).map_err(map_hash_error)?;
        self.users
            .insert(&user, &hash)
            .await
            .map_err(map_user_persistence_error)?;
        Ok(user)
    }
}

#[async_trait]
impl<U, H> LoginService for UserAccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let Some(stored) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_persistence_error)?
        else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hash_error)?;
        if !matches {
            warn!(user_id = %stored.user.id(), "login rejected");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        Ok(stored.user)
    }
}

#[async_trait]
impl<U, H> UserAccountCommand for UserAccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn create_user(
        &self,
        caller: &Caller,
        request: CreateUserRequest,
    ) -> Result<User, Error> {
        authorize(caller, Operation::CreateUserAccount, None)
            .map_err(|_| Error::forbidden("only admins may create accounts"))?;
        let user = self.register(request).await?;
        info!(
            user_id = %user.id(),
            role = %user.role(),
            caller_id = %caller.id(),
            "user account created"
        );
        Ok(user)
    }

    async fn update_profile(
        &self,
        caller: &Caller,
        request: ProfileUpdateRequest,
    ) -> Result<User, Error> {
        if request.is_empty() {
            return Err(Error::invalid_request(
                "profile update must change at least one field",
            ));
        }
        let ProfileUpdateRequest {
            name,
            image,
            password,
        } = request;
        let password_hash = password
            .as_ref()
            .map(|password| self.hasher.hash(password))
            .transpose()
            .map_err(map_hash_error)?;
        let changes = ProfileChanges {
            name,
            image,
            password_hash,
            updated_at: self.clock.utc(),
        };
        let user = self
            .users
            .update_profile(caller.id(), &changes)
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {} not found", caller.id())))?;
        info!(user_id = %user.id(), "profile updated");
        Ok(user)
    }

    async fn ensure_admin(
        &self,
        email: EmailAddress,
        password: NewPassword,
        name: DisplayName,
    ) -> Result<bool, Error> {
        let existing = self
            .users
            .find_credentials_by_email(email.as_ref())
            .await
            .map_err(map_user_persistence_error)?;
        if existing.is_some() {
            return Ok(false);
        }
        let request = CreateUserRequest {
            email,
            password,
            name,
            role: Role::Admin,
            department: None,
        };
        match self.register(request).await {
            Ok(user) => {
                info!(user_id = %user.id(), "bootstrap admin created");
                Ok(true)
            }
            // Another process created it between the lookup and the insert.
            Err(err) if err.code() == crate::domain::ErrorCode::Conflict => Ok(false),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<U, H> UsersQuery for UserAccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn current_user(&self, caller: &Caller) -> Result<User, Error> {
        self.users
            .find_by_id(caller.id())
            .await
            .map_err(map_user_persistence_error)?
            .ok_or_else(|| Error::unauthorized("session user no longer exists"))
    }

    async fn list_staff(&self, caller: &Caller, role: Role) -> Result<Vec<User>, Error> {
        authorize(caller, Operation::ListStaff, None)
            .map_err(|_| Error::forbidden("only admins may list staff"))?;
        self.users
            .list_by_role(role)
            .await
            .map_err(map_user_persistence_error)
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;
