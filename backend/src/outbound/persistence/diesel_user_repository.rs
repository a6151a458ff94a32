//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Rows are converted through the validated domain constructors, so a row
//! that no longer satisfies the user invariants surfaces as a query error
//! instead of an invalid `User`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    PasswordHash, ProfileChanges, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    Department, DisplayName, EmailAddress, ProfileImage, Role, User, UserDraft, UserId,
    UserSummary,
};

use super::diesel_basic_error_mapping::{
    map_basic_diesel_error, map_basic_pool_error, unique_violation,
};
use super::models::{NewUserRow, UserProfileUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn invalid_row(id: Uuid, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("invalid user row {id}: {err}"))
}

/// Convert a database row into a validated domain user and its hash.
fn row_to_account(row: UserRow) -> Result<StoredCredentials, UserPersistenceError> {
    let UserRow {
        id,
        email,
        password_hash,
        name,
        role,
        department,
        image,
        created_at,
        updated_at,
    } = row;

    let department = department
        .map(|code| code.parse::<Department>())
        .transpose()
        .map_err(|err| invalid_row(id, err))?;
    let user = User::try_new(UserDraft {
        id: UserId::from_uuid(id),
        email: EmailAddress::new(email).map_err(|err| invalid_row(id, err))?,
        name: DisplayName::new(name).map_err(|err| invalid_row(id, err))?,
        role: role.parse::<Role>().map_err(|err| invalid_row(id, err))?,
        department,
        image: image
            .map(ProfileImage::new)
            .transpose()
            .map_err(|err| invalid_row(id, err))?,
        created_at,
        updated_at,
    })
    .map_err(|err| invalid_row(id, err))?;

    Ok(StoredCredentials {
        user,
        password_hash: PasswordHash::new(password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    row_to_account(row).map(|account| account.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            password_hash: password_hash.as_ref(),
            name: user.name().as_ref(),
            role: user.role().as_str(),
            department: user.department().map(Department::code),
            image: user.image().map(AsRef::as_ref),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| match unique_violation(&err) {
                Some(EMAIL_CONSTRAINT) => {
                    UserPersistenceError::duplicate_email(user.email().to_string())
                }
                _ => map_diesel_error(err),
            })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_account).transpose()
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(role.as_str()))
            .order((users::name.asc(), users::id.asc()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn find_summaries(
        &self,
        ids: &[UserId],
    ) -> Result<Vec<UserSummary>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid, String, String)> = users::table
            .filter(users::id.eq_any(uuids))
            .select((users::id, users::name, users::email))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter()
            .map(|(id, name, email)| {
                Ok(UserSummary {
                    id: UserId::from_uuid(id),
                    name: DisplayName::new(name).map_err(|err| invalid_row(id, err))?,
                    email: EmailAddress::new(email).map_err(|err| invalid_row(id, err))?,
                })
            })
            .collect()
    }

    async fn update_profile(
        &self,
        id: &UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let update = UserProfileUpdate {
            name: changes.name.as_ref().map(AsRef::as_ref),
            image: changes.image.as_ref().map(AsRef::as_ref),
            password_hash: changes.password_hash.as_ref().map(AsRef::as_ref),
            updated_at: changes.updated_at,
        };
        let row = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set(&update)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}
