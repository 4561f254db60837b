use anyhow::anyhow;
use chrono::{DateTime, Utc};
use fancy_regex::Regex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::credentials::{self, CredentialError};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Admin {
    pub fn verify_password(&self, password: &str) -> Result<(), CredentialError> {
        credentials::verify_password(&self.password_hash, password)
    }
}

/// An admin account that has passed validation and carries a hashed password.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

static USERNAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]{3,}$").ok());
static EMAIL_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+$").ok());
static PASSWORD_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?=.*[a-z])(?=.*[A-Z])(?=.*\d).{8,}$").ok());

impl NewAdmin {
    pub fn new(username: &str, email: &str, password: &str) -> anyhow::Result<Self> {
        require(
            &USERNAME_RE,
            "username",
            username,
            "Username must be at least 3 characters and contain only letters, numbers, or underscores.",
        )?;
        require(&EMAIL_RE, "email", email, "Invalid email address.")?;
        require(
            &PASSWORD_RE,
            "password",
            password,
            "Password must be at least 8 characters long and include at least one lowercase letter, one uppercase letter, and one number.",
        )?;

        let password_hash = credentials::hash_password(password)?;

        Ok(NewAdmin {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
    }
}

/// Fails with `rejection` unless `value` matches `re`. A regex that failed to
/// compile rejects everything.
fn require(re: &Lazy<Option<Regex>>, field: &str, value: &str, rejection: &str) -> anyhow::Result<()> {
    let re = Lazy::force(re)
        .as_ref()
        .ok_or_else(|| anyhow!("{field} regex failed to compile"))?;
    let matched = re
        .is_match(value)
        .map_err(|e| anyhow!("regex error for {field}: {e}"))?;
    if matched { Ok(()) } else { Err(anyhow!("{rejection}")) }
}
