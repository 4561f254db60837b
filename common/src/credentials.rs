//! Password hashing for admins and the shared API key check for customers.

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hashing(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("password does not match")]
    PasswordMismatch,
    #[error("missing api key")]
    MissingApiKey,
    #[error("missing merchant name")]
    MissingMerchantName,
    #[error("invalid api key or merchant name")]
    InvalidCustomer,
}

/// Hashes a password with argon2 and a fresh random salt. The cost
/// parameters are embedded in the returned PHC string.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

pub fn verify_password(stored_hash: &str, password: &str) -> Result<(), CredentialError> {
    let hash =
        PasswordHash::new(stored_hash).map_err(|e| CredentialError::MalformedHash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &hash)
        .map_err(|_| CredentialError::PasswordMismatch)
}

/// The single API key / merchant name pair accepted from customers.
#[derive(Clone)]
pub struct CustomerCredentials {
    api_key: String,
    merchant_name: String,
}

impl CustomerCredentials {
    pub fn new(api_key: impl Into<String>, merchant_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            merchant_name: merchant_name.into(),
        }
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    /// Checks the `X-API-Key` / `X-Merchant-Name` header values and returns
    /// the authenticated merchant name.
    pub fn verify(
        &self,
        api_key: Option<&str>,
        merchant_name: Option<&str>,
    ) -> Result<String, CredentialError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(CredentialError::MissingApiKey)?;
        let merchant_name = merchant_name
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(CredentialError::MissingMerchantName)?;

        if api_key != self.api_key || merchant_name != self.merchant_name {
            return Err(CredentialError::InvalidCustomer);
        }
        Ok(merchant_name.to_string())
    }
}

impl std::fmt::Debug for CustomerCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomerCredentials")
            .field("api_key", &"<redacted>")
            .field("merchant_name", &self.merchant_name)
            .finish()
    }
}
