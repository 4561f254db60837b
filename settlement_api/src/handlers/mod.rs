mod admin;
mod auth;
mod customer;

use actix_web::{HttpResponse, Responder, web};
use common::Page;
use serde::Deserialize;

pub use admin::*;
pub use auth::*;
pub use customer::*;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
    page_size: Option<String>,
}

impl PageQuery {
    fn page(&self) -> Result<Page, ApiError> {
        Page::parse(self.page.as_deref(), self.page_size.as_deref()).map_err(ApiError::bad_request)
    }
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

impl IdQuery {
    fn id(&self) -> Result<i64, ApiError> {
        let raw = self
            .id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::bad_request("id is required"))?;
        raw.parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| ApiError::bad_request("invalid id"))
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

/// Registers every endpoint. Each path answers 405 for verbs it does not serve.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .content_type_required(false)
            .error_handler(|err, _| {
                log::debug!("Rejected JSON body: {}", err);
                ApiError::bad_request("invalid json body").into()
            }),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| {
                log::debug!("Rejected query string: {}", err);
                ApiError::bad_request("invalid query").into()
            }),
    );

    let routes: [(&str, actix_web::Route); 10] = [
        ("/admin/login", web::post().to(login)),
        ("/admin/stats", web::get().to(admin_stats)),
        ("/admin/ready-processing", web::get().to(ready_processing)),
        ("/admin/recent-orders", web::get().to(recent_orders)),
        ("/admin/order", web::get().to(admin_order_detail)),
        ("/admin/order/status", web::post().to(update_order_status)),
        ("/customer/createOrder", web::post().to(create_order)),
        ("/customer/orders", web::get().to(list_customer_orders)),
        ("/customer/order", web::get().to(get_customer_order)),
        ("/health", web::get().to(health)),
    ];

    for (path, route) in routes {
        cfg.service(
            web::resource(path)
                .route(route)
                .default_service(web::to(method_not_allowed)),
        );
    }
}
