//! HS256 bearer tokens for the admin API.

use chrono::{DateTime, TimeDelta, Utc};
use jwt_compact::alg::{Hs256, Hs256Key};
use jwt_compact::prelude::*;
use jwt_compact::{Claim, CreationError, ParseError, ValidationError};
use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("missing authorization header")]
    MissingHeader,
    #[error("invalid authorization header")]
    InvalidHeader,
    #[error("empty token")]
    Empty,
    #[error("malformed token: {0}")]
    Malformed(#[from] ParseError),
    #[error("invalid token: {0}")]
    Invalid(#[from] ValidationError),
    #[error("failed to sign token: {0}")]
    Signing(#[from] CreationError),
}

/// Claims carried next to `iat`/`exp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct RoleClaims {
    sub: String,
    role: String,
    iss: String,
}

/// The decoded contents of a token that passed signature and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub subject: String,
    pub role: String,
    pub issuer: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl VerifiedClaims {
    pub fn subject_id(&self) -> Option<i64> {
        self.subject.parse().ok()
    }

    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

pub fn issue_token(
    subject_id: i64,
    role: &str,
    secret: &[u8],
    issuer: &str,
    ttl: TimeDelta,
) -> Result<String, TokenError> {
    let key = Hs256Key::new(secret);
    let custom = RoleClaims {
        sub: subject_id.to_string(),
        role: role.to_string(),
        iss: issuer.to_string(),
    };
    let claims = Claims::new(custom).set_duration_and_issuance(&TimeOptions::default(), ttl);
    let header = Header::empty().with_token_type("JWT");
    Ok(Hs256.token(&header, &claims, &key)?)
}

/// Verifies the signature, the `HS256` algorithm and the expiry of `token`.
/// Expiry is checked without clock leeway.
pub fn validate_token(token: &str, secret: &[u8]) -> Result<VerifiedClaims, TokenError> {
    let key = Hs256Key::new(secret);
    let untrusted = UntrustedToken::new(token)?;
    let token: Token<RoleClaims> = Hs256.validator(&key).validate(&untrusted)?;
    let claims = token.claims();
    claims.validate_expiration(&TimeOptions::new(TimeDelta::zero(), Utc::now))?;

    let expires_at = claims
        .expiration
        .ok_or(TokenError::Invalid(ValidationError::NoClaim(Claim::Expiration)))?;
    Ok(VerifiedClaims {
        subject: claims.custom.sub.clone(),
        role: claims.custom.role.clone(),
        issuer: claims.custom.iss.clone(),
        issued_at: claims.issued_at,
        expires_at,
    })
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header
        .filter(|h| !h.is_empty())
        .ok_or(TokenError::MissingHeader)?;
    let (scheme, token) = header.split_once(' ').ok_or(TokenError::InvalidHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::InvalidHeader);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jwt_compact::alg::{Hs384, Hs384Key};

    const SECRET: &[u8] = b"unit-test-secret";

    #[test]
    fn issued_token_validates_with_subject_and_role() {
        let token = issue_token(7, ADMIN_ROLE, SECRET, "settlement-api", TimeDelta::minutes(60)).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert_eq!(claims.subject_id(), Some(7));
        assert!(claims.is_admin());
        assert_eq!(claims.issuer, "settlement-api");
        assert!(claims.expires_at > Utc::now());
        assert!(claims.issued_at.is_some());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(7, ADMIN_ROLE, SECRET, "settlement-api", TimeDelta::minutes(-5)).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid(ValidationError::Expired))
        ));
    }

    #[test]
    fn token_expired_seconds_ago_is_rejected() {
        let token = issue_token(7, ADMIN_ROLE, SECRET, "settlement-api", TimeDelta::seconds(-3)).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid(ValidationError::Expired))
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(7, ADMIN_ROLE, SECRET, "settlement-api", TimeDelta::minutes(60)).unwrap();
        assert!(matches!(
            validate_token(&token, b"another-secret"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let token = issue_token(7, "viewer", SECRET, "settlement-api", TimeDelta::minutes(60)).unwrap();
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let forged = issue_token(7, ADMIN_ROLE, b"attacker", "settlement-api", TimeDelta::minutes(60)).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        let tampered = parts.join(".");
        assert!(validate_token(&tampered, SECRET).is_err());
    }

    #[test]
    fn other_algorithm_is_rejected() {
        let key = Hs384Key::new(SECRET);
        let claims = Claims::new(RoleClaims {
            sub: "7".into(),
            role: ADMIN_ROLE.into(),
            iss: "settlement-api".into(),
        })
        .set_duration_and_issuance(&TimeOptions::default(), TimeDelta::minutes(60));
        let token = Hs384.token(&Header::empty(), &claims, &key).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid(ValidationError::AlgorithmMismatch { .. }))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            validate_token("not-a-token", SECRET),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert_eq!(bearer_token(Some("bearer  abc ")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(TokenError::MissingHeader)));
        assert!(matches!(bearer_token(Some("Basic abc")), Err(TokenError::InvalidHeader)));
        assert!(matches!(bearer_token(Some("Bearer")), Err(TokenError::InvalidHeader)));
        assert!(matches!(bearer_token(Some("Bearer   ")), Err(TokenError::Empty)));
    }
}
