//! Request guards for the two kinds of callers.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use common::{VerifiedClaims, token};

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";
pub const MERCHANT_NAME_HEADER: &str = "X-Merchant-Name";

fn app_state(req: &HttpRequest) -> Result<&web::Data<AppState>, ApiError> {
    req.app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::internal("request guard", "AppState is not registered"))
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// An admin caller: a valid bearer token whose role claim is `admin`.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub VerifiedClaims);

impl AdminClaims {
    fn authenticate(req: &HttpRequest) -> Result<Self, ApiError> {
        let state = app_state(req)?;
        let claims = token::bearer_token(header(req, AUTHORIZATION.as_str()))
            .and_then(|bearer| state.auth.validate(bearer))
            .map_err(|e| {
                log::warn!("Rejected admin token for {}: {}", req.path(), e);
                ApiError::Unauthorized
            })?;
        if !claims.is_admin() {
            log::warn!("Token for subject {} lacks the admin role", claims.subject);
            return Err(ApiError::Unauthorized);
        }
        Ok(AdminClaims(claims))
    }
}

impl FromRequest for AdminClaims {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::authenticate(req))
    }
}

/// A customer caller, identified by the merchant name it authenticated as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merchant(pub String);

impl Merchant {
    fn authenticate(req: &HttpRequest) -> Result<Self, ApiError> {
        let state = app_state(req)?;
        state
            .customer
            .verify(header(req, API_KEY_HEADER), header(req, MERCHANT_NAME_HEADER))
            .map(Merchant)
            .map_err(|e| {
                log::warn!("Rejected customer credentials for {}: {}", req.path(), e);
                ApiError::Unauthorized
            })
    }
}

impl FromRequest for Merchant {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::authenticate(req))
    }
}
