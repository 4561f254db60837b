use std::sync::Arc;

use anyhow::{Context, anyhow};
use chrono::TimeDelta;
use common::{CustomerCredentials, Database, DatabaseConfig, TokenError, VerifiedClaims, token};

use crate::state::AppState;

pub const DEFAULT_JWT_ISSUER: &str = "settlement-api";
pub const DEFAULT_JWT_TTL_MINUTES: i64 = 60;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

const REQUIRED: [&str; 8] = [
    "MYSQL_HOST",
    "MYSQL_PORT",
    "MYSQL_USER",
    "MYSQL_PASSWORD",
    "MYSQL_DB",
    "JWT_SECRET",
    "CUSTOMER_API_KEY",
    "CUSTOMER_MERCHANT_NAME",
];

/// Signing settings for admin bearer tokens.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl: TimeDelta,
}

impl AuthConfig {
    pub fn issue_admin_token(&self, admin_id: i64) -> Result<String, TokenError> {
        token::issue_token(
            admin_id,
            common::ADMIN_ROLE,
            self.secret.as_bytes(),
            &self.issuer,
            self.ttl,
        )
    }

    pub fn validate(&self, bearer: &str) -> Result<VerifiedClaims, TokenError> {
        token::validate_token(bearer, self.secret.as_bytes())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub customer: CustomerCredentials,
    pub bind_addr: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<&str> = REQUIRED.into_iter().filter(|key| get(*key).is_none()).collect();
        if !missing.is_empty() {
            return Err(anyhow!("missing env vars: {}", missing.join(", ")));
        }

        let database = DatabaseConfig::from_lookup(&lookup)?;

        let ttl_minutes = match get("JWT_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .context("JWT_TTL_MINUTES must be a positive integer")?,
            None => DEFAULT_JWT_TTL_MINUTES,
        };
        let ttl = TimeDelta::try_minutes(ttl_minutes).context("JWT_TTL_MINUTES is too large")?;

        let auth = AuthConfig {
            secret: get("JWT_SECRET").unwrap_or_default(),
            issuer: get("JWT_ISSUER").unwrap_or_else(|| DEFAULT_JWT_ISSUER.to_string()),
            ttl,
        };

        let customer = CustomerCredentials::new(
            get("CUSTOMER_API_KEY").unwrap_or_default(),
            get("CUSTOMER_MERCHANT_NAME").unwrap_or_default(),
        );

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            database,
            auth,
            customer,
            bind_addr,
        })
    }

    pub async fn create_app_state(&self) -> anyhow::Result<AppState> {
        let db = Database::new(&self.database)
            .await
            .context("Failed to initialize database")?;
        db.ensure_schema().await?;
        log::info!("Database initialized successfully!");

        Ok(AppState::new(
            Arc::new(db),
            self.auth.clone(),
            self.customer.clone(),
        ))
    }
}
