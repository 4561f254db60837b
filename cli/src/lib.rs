mod args;

use std::io::{BufRead, Write};

use anyhow::{Context, anyhow};
pub use args::{Args, Commands, CreateAdminArgs, HashPasswordArgs};
use clap::Parser;
use common::{Database, DatabaseConfig, NewAdmin, Storage, StoreError, credentials};

/// Runs the CLI command parser and executes the selected command.
/// Returns true if a CLI command was handled, false otherwise.
pub async fn run_cli() -> bool {
    let args = Args::parse();
    match &args.command {
        Some(Commands::HashPassword(hash_args)) => {
            let password = match &hash_args.password {
                Some(p) => Ok(p.clone()),
                None => read_password(),
            };
            match password.and_then(|p| hash_password(&p)) {
                Ok(hash) => println!("{hash}"),
                Err(e) => eprintln!("Failed to hash password: {e}"),
            }
            true
        }
        Some(Commands::CreateAdmin(admin_args)) => {
            if let Err(e) =
                create_admin(&admin_args.username, &admin_args.email, &admin_args.password).await
            {
                eprintln!("Failed to create admin: {e:#}");
            }
            true
        }
        None => false,
    }
}

fn read_password() -> anyhow::Result<String> {
    print!("Password: ");
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Hashes a non-empty password for manual insertion into `admin_users`.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    if password.is_empty() {
        return Err(anyhow!("password must not be empty"));
    }
    Ok(credentials::hash_password(password)?)
}

/// Creates an admin: validates input, hashes password, checks for duplicates, and saves to DB.
async fn create_admin(username: &str, email: &str, password: &str) -> anyhow::Result<()> {
    let admin = NewAdmin::new(username, email, password).context("Validation error")?;

    let config = DatabaseConfig::from_env()?;
    let db = Database::new(&config).await?;
    db.ensure_schema().await?;

    save_admin(&db, &admin).await?;
    println!("Admin '{}' created successfully.", username);
    Ok(())
}

async fn save_admin(store: &dyn Storage, admin: &NewAdmin) -> anyhow::Result<i64> {
    match store.get_admin_by_username(&admin.username).await {
        Ok(_) => {
            return Err(anyhow!(
                "An admin with username '{}' already exists.",
                admin.username
            ));
        }
        Err(StoreError::NotFound) => {}
        Err(e) => return Err(e).context("Database error"),
    }
    store.insert_admin(admin).await.context("Database error")
}
