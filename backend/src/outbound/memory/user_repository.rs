//! Mutex-guarded `UserRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    PasswordHash, ProfileChanges, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{Role, User, UserDraft, UserId, UserSummary};

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password_hash: PasswordHash,
}

/// In-memory user store keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<UserId, Account>>,
}

impl InMemoryUserRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn accounts(&self) -> Result<MutexGuard<'_, HashMap<UserId, Account>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

fn with_changes(user: &User, changes: &ProfileChanges) -> Result<User, UserPersistenceError> {
    User::try_new(UserDraft {
        id: user.id().clone(),
        email: user.email().clone(),
        name: changes.name.clone().unwrap_or_else(|| user.name().clone()),
        role: user.role(),
        department: user.department(),
        image: changes.image.clone().or_else(|| user.image().cloned()),
        created_at: user.created_at(),
        updated_at: changes.updated_at.max(user.created_at()),
    })
    .map_err(|err| UserPersistenceError::query(err.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = self.accounts()?;
        if accounts
            .values()
            .any(|account| account.user.email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_email(user.email().to_string()));
        }
        accounts.insert(
            user.id().clone(),
            Account {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.accounts()?.get(id).map(|account| account.user.clone()))
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .accounts()?
            .values()
            .find(|account| account.user.email().as_ref() == email)
            .map(|account| StoredCredentials {
                user: account.user.clone(),
                password_hash: account.password_hash.clone(),
            }))
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self
            .accounts()?
            .values()
            .filter(|account| account.user.role() == role)
            .map(|account| account.user.clone())
            .collect();
        users.sort_by(|a, b| a.name().as_ref().cmp(b.name().as_ref()));
        Ok(users)
    }

    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        let accounts = self.accounts()?;
        Ok(ids
            .iter()
            .filter_map(|id| accounts.get(id))
            .map(|account| account.user.summary())
            .collect())
    }

    async fn update_profile(
        &self,
        id: &UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut accounts = self.accounts()?;
        let Some(account) = accounts.get_mut(id) else {
            return Ok(None);
        };
        account.user = with_changes(&account.user, changes)?;
        if let Some(hash) = &changes.password_hash {
            account.password_hash = hash.clone();
        }
        Ok(Some(account.user.clone()))
    }
}
