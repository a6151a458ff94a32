//! Tests for the user account service.

use std::sync::Arc;

use mockable::MockClock;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockPasswordHasher, MockUserRepository, PasswordHash, StoredCredentials,
};
use crate::domain::test_fixtures::{at, caller, user_with};
use crate::domain::{Department, ErrorCode, ProfileImage};

type Service = UserAccountService<MockUserRepository, MockPasswordHasher>;

fn service(users: MockUserRepository, hasher: MockPasswordHasher) -> Service {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(at(12));
    UserAccountService::new(Arc::new(users), Arc::new(hasher), Arc::new(clock))
}

fn stored(role: Role) -> StoredCredentials {
    StoredCredentials {
        user: user_with(&UserId::random(), role),
        password_hash: PasswordHash::new("$argon2id$stored"),
    }
}

fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts("tech@example.edu", "Secr3t!pass").expect("credentials")
}

fn create_request(role: Role, department: Option<Department>) -> CreateUserRequest {
    CreateUserRequest {
        email: EmailAddress::new("new.user@example.edu").expect("email"),
        password: NewPassword::new("Str0ng!pass").expect("password"),
        name: DisplayName::new("New User").expect("name"),
        role,
        department,
    }
}

#[tokio::test]
async fn authenticate_returns_user_on_matching_password() {
    let account = stored(Role::Technician);
    let expected = account.user.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_credentials_by_email()
        .withf(|email| email == "tech@example.edu")
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(true));

    let user = service(users, hasher)
        .authenticate(&credentials())
        .await
        .expect("authenticated");

    assert_eq!(user, expected);
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn unknown_email_and_wrong_password_look_the_same(#[case] account_exists: bool) {
    let mut users = MockUserRepository::new();
    let found = account_exists.then(|| stored(Role::Technician));
    users
        .expect_find_credentials_by_email()
        .return_once(move |_| Ok(found));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().returning(|_, _| Ok(false));

    let error = service(users, hasher)
        .authenticate(&credentials())
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn admin_creates_account_with_hashed_password() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .times(1)
        .withf(|user, hash| {
            user.role() == Role::Technician && *hash == PasswordHash::new("hashed")
        })
        .returning(|_, _| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let user = service(users, hasher)
        .create_user(&caller(Role::Admin), create_request(Role::Technician, None))
        .await
        .expect("created");

    assert_eq!(user.email().as_ref(), "new.user@example.edu");
    assert_eq!(user.created_at(), at(12));
}

#[rstest]
#[case(Role::Coordinator)]
#[case(Role::Technician)]
#[tokio::test]
async fn only_admins_create_accounts(#[case] role: Role) {
    let mut users = MockUserRepository::new();
    users.expect_insert().times(0);

    let error = service(users, MockPasswordHasher::new())
        .create_user(&caller(role), create_request(Role::Technician, None))
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn coordinator_account_requires_department() {
    let mut users = MockUserRepository::new();
    users.expect_insert().times(0);

    let error = service(users, MockPasswordHasher::new())
        .create_user(&caller(Role::Admin), create_request(Role::Coordinator, None))
        .await
        .expect_err("validation");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .return_once(|user, _| Err(UserPersistenceError::duplicate_email(user.email().to_string())));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let error = service(users, hasher)
        .create_user(
            &caller(Role::Admin),
            create_request(Role::Coordinator, Some(Department::Cse)),
        )
        .await
        .expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn profile_update_hashes_new_password() {
    let me = caller(Role::Technician);
    let updated = user_with(me.id(), Role::Technician);
    let mut users = MockUserRepository::new();
    users
        .expect_update_profile()
        .withf(|_, changes| {
            changes
                .password_hash
                .as_ref()
                .is_some_and(|hash| *hash == PasswordHash::new("rehashed"))
                && changes.updated_at == at(12)
                && changes.image.is_some()
        })
        .return_once(move |_, _| Ok(Some(updated)));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("rehashed")));

    let request = ProfileUpdateRequest {
        name: None,
        image: Some(ProfileImage::new("https://cdn.example.edu/me.png").expect("image")),
        password: Some(NewPassword::new("N3w!password").expect("password")),
    };
    let user = service(users, hasher)
        .update_profile(&me, request)
        .await
        .expect("updated");

    assert_eq!(user.id(), me.id());
}

#[tokio::test]
async fn empty_profile_update_is_rejected() {
    let error = service(MockUserRepository::new(), MockPasswordHasher::new())
        .update_profile(&caller(Role::Admin), ProfileUpdateRequest::default())
        .await
        .expect_err("empty");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[case(true, false)]
#[case(false, true)]
#[tokio::test]
async fn ensure_admin_creates_account_once(#[case] exists: bool, #[case] created: bool) {
    let mut users = MockUserRepository::new();
    let found = exists.then(|| stored(Role::Admin));
    users
        .expect_find_credentials_by_email()
        .return_once(move |_| Ok(found));
    users
        .expect_insert()
        .times(usize::from(created))
        .withf(|user, _| user.role() == Role::Admin)
        .returning(|_, _| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("hashed")));

    let outcome = service(users, hasher)
        .ensure_admin(
            EmailAddress::new("root@example.edu").expect("email"),
            NewPassword::new("B00tstrap!").expect("password"),
            DisplayName::new("Helpdesk Admin").expect("name"),
        )
        .await
        .expect("ensured");

    assert_eq!(outcome, created);
}

#[tokio::test]
async fn staff_listing_is_admin_only() {
    let mut users = MockUserRepository::new();
    users.expect_list_by_role().times(0);

    let error = service(users, MockPasswordHasher::new())
        .list_staff(&caller(Role::Coordinator), Role::Technician)
        .await
        .expect_err("forbidden");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn current_user_reads_the_session_user() {
    let me = caller(Role::Coordinator);
    let user = user_with(me.id(), Role::Coordinator);
    let expected = user.clone();
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(user)));

    let found = service(users, MockPasswordHasher::new())
        .current_user(&me)
        .await
        .expect("found");

    assert_eq!(found, expected);
}
