use actix_web::{HttpResponse, web};
use common::StoreError;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginData {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub token: String,
}

pub async fn login(
    login_data: web::Json<LoginData>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if login_data.username.is_empty() || login_data.password.is_empty() {
        return Err(ApiError::bad_request("username and password required"));
    }

    let admin = app_state
        .storage
        .get_admin_by_username(&login_data.username)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => {
                log::warn!("Failed to get admin with username: {}", login_data.username);
                ApiError::InvalidCredentials
            }
            other => ApiError::internal("admin login query error", other),
        })?;

    if let Err(err) = admin.verify_password(&login_data.password) {
        log::warn!(
            "Invalid password for admin {}: {}",
            login_data.username,
            err
        );
        return Err(ApiError::InvalidCredentials);
    }

    let token = app_state
        .auth
        .issue_admin_token(admin.id)
        .map_err(|e| ApiError::internal("admin login token error", e))?;

    log::info!("Admin {} logged in", admin.username);
    Ok(HttpResponse::Ok().json(LoginResponse {
        id: admin.id,
        username: admin.username,
        email: admin.email,
        token,
    }))
}
