#![allow(dead_code, unused_macros)]

use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::TimeDelta;
use common::{CustomerCredentials, InMemoryStorage, NewAdmin, Storage};
use serde_json::{Value, json};
use settlement_api::config::AuthConfig;
use settlement_api::{AppState, configure};

pub const JWT_SECRET: &str = "integration-secret";
pub const API_KEY: &str = "key-123";
pub const MERCHANT: &str = "Acme Pay";
pub const ADMIN_USERNAME: &str = "ops_lead";
pub const ADMIN_EMAIL: &str = "ops@example.com";
pub const ADMIN_PASSWORD: &str = "Settle2024";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        secret: JWT_SECRET.to_string(),
        issuer: "settlement-api".to_string(),
        ttl: TimeDelta::minutes(60),
    }
}

pub fn state(storage: InMemoryStorage) -> AppState {
    AppState::new(
        Arc::new(storage),
        auth_config(),
        CustomerCredentials::new(API_KEY, MERCHANT),
    )
}

pub fn app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure)
}

pub async fn seed_admin(storage: &InMemoryStorage) -> i64 {
    let admin = NewAdmin::new(ADMIN_USERNAME, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();
    storage.insert_admin(&admin).await.unwrap()
}

pub fn admin_token(admin_id: i64) -> String {
    auth_config().issue_admin_token(admin_id).unwrap()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub fn order_body() -> Value {
    json!({
        "transaction_network": "TRON",
        "transaction_asset": "USDT",
        "txid": "0x9f2c4e",
        "amount": 1500.5,
        "beneficiary_name": "Jane Roe",
        "bank_country": "Canada",
        "bank_name": "First Bank",
        "iban": "CA0012345678",
        "swift": "FBNKCA22",
        "reference_note": "invoice 42"
    })
}

/// Posts a valid order as the configured merchant and yields its id.
macro_rules! create_order {
    ($app:expr, $body:expr) => {{
        let req = actix_web::test::TestRequest::post()
            .uri("/customer/createOrder")
            .insert_header(("X-API-Key", support::API_KEY))
            .insert_header(("X-Merchant-Name", support::MERCHANT))
            .set_json($body)
            .to_request();
        let resp = actix_web::test::call_service($app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let created: serde_json::Value = actix_web::test::read_body_json(resp).await;
        created["id"].as_i64().unwrap()
    }};
}
