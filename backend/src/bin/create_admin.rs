//! Create an admin account directly in PostgreSQL.
//!
//! ```text
//! HELPDESK_ADMIN_PASSWORD='Sup3r$ecret' create-admin \
//!     --database-url postgres://localhost/helpdesk \
//!     --email root@example.edu --name "Root Admin"
//! ```
//!
//! Without `HELPDESK_ADMIN_PASSWORD` the password is read from the first line
//! of standard input.

use std::io::{self, BufRead};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use zeroize::Zeroizing;

use helpdesk::domain::ports::UserAccountCommand;
use helpdesk::domain::{DisplayName, EmailAddress, NewPassword, UserAccountService};
use helpdesk::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
use helpdesk::outbound::security::Argon2PasswordHasher;

const PASSWORD_ENV: &str = "HELPDESK_ADMIN_PASSWORD";

#[derive(Parser, Debug)]
#[command(name = "create-admin", about = "Create a helpdesk admin account")]
struct Args {
    /// PostgreSQL connection string.
    #[arg(long, env = "HELPDESK_DATABASE_URL")]
    database_url: String,
    /// Email address of the new admin.
    #[arg(long)]
    email: String,
    /// Display name of the new admin.
    #[arg(long, default_value = "Helpdesk Admin")]
    name: String,
}

fn read_password(from_env: Option<String>, stdin: impl BufRead) -> Result<Zeroizing<String>> {
    if let Some(password) = from_env {
        return Ok(Zeroizing::new(password));
    }
    let mut line = Zeroizing::new(String::new());
    let mut stdin = stdin;
    stdin
        .read_line(&mut line)
        .wrap_err("failed to read password from stdin")?;
    let trimmed = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_owned());
    if trimmed.is_empty() {
        return Err(eyre!("no password given; set {PASSWORD_ENV} or pipe it on stdin"));
    }
    Ok(trimmed)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let password = read_password(std::env::var(PASSWORD_ENV).ok(), io::stdin().lock())?;
    let email = EmailAddress::new(&args.email).wrap_err("invalid email")?;
    let name = DisplayName::new(args.name).wrap_err("invalid name")?;
    let password = NewPassword::new(&password).wrap_err("password rejected by policy")?;

    let pool = DbPool::new(PoolConfig::new(args.database_url).with_max_size(1))
        .await
        .wrap_err("failed to connect to the database")?;
    let accounts = UserAccountService::new(
        Arc::new(DieselUserRepository::new(pool)),
        Arc::new(Argon2PasswordHasher),
        Arc::new(DefaultClock),
    );

    let created = accounts
        .ensure_admin(email.clone(), password, name)
        .await
        .wrap_err("failed to store admin account")?;
    if created {
        println!("created admin {email}");
    } else {
        println!("an account for {email} already exists; nothing changed");
    }
    Ok(())
}
