//! Startup creation of the first admin account.

use thiserror::Error;
use tracing::info;

use crate::domain::ports::UserAccountCommand;
use crate::domain::{
    DisplayName, EmailAddress, Error, NewPassword, PasswordPolicyError, UserValidationError,
};
use crate::settings::AppSettings;

/// Errors returned while bootstrapping the admin account.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Only one of email and password was configured.
    #[error("bootstrap admin needs both HELPDESK_BOOTSTRAP_ADMIN_EMAIL and a password")]
    Incomplete,
    /// Email or name failed validation.
    #[error("invalid bootstrap admin: {0}")]
    InvalidAccount(#[from] UserValidationError),
    /// Password does not satisfy the policy.
    #[error("invalid bootstrap admin password: {0}")]
    WeakPassword(#[from] PasswordPolicyError),
    /// The account store rejected the write.
    #[error("bootstrap admin could not be stored: {0}")]
    Store(#[from] Error),
}

/// Create the configured admin unless that email is already registered.
///
/// Returns `Ok(false)` when bootstrapping is not configured or the account
/// already exists.
///
/// # Errors
/// Returns [`BootstrapError`] when the configuration is partial or invalid,
/// or when the store fails.
pub async fn bootstrap_admin(
    settings: &AppSettings,
    accounts: &dyn UserAccountCommand,
) -> Result<bool, BootstrapError> {
    let (email, password) = match (
        settings.bootstrap_admin_email.as_deref(),
        settings.bootstrap_admin_password.as_deref(),
    ) {
        (None, None) => {
            info!(reason = "not configured", "admin bootstrap skipped");
            return Ok(false);
        }
        (Some(email), Some(password)) => (email, password),
        _ => return Err(BootstrapError::Incomplete),
    };

    let email = EmailAddress::new(email)?;
    let password = NewPassword::new(password)?;
    let name = DisplayName::new(settings.bootstrap_admin_name())?;
    let created = accounts.ensure_admin(email.clone(), password, name).await?;
    if created {
        info!(email = %email, "bootstrap admin created");
    } else {
        info!(email = %email, "bootstrap admin already present");
    }
    Ok(created)
}
