use actix_web::{HttpResponse, web};
use common::{AdminView, OrderStatus};
use serde::Deserialize;

use super::{IdQuery, PageQuery};
use crate::error::ApiError;
use crate::extractors::AdminClaims;
use crate::state::AppState;
use crate::views::{AdminList, AdminOrderDetail, OrderEnvelope, ReadyRow, RecentRow};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusData {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub status: String,
}

pub async fn admin_stats(
    _admin: AdminClaims,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stats = app_state
        .storage
        .stats()
        .await
        .map_err(|e| ApiError::internal("admin stats error", e))?;
    Ok(HttpResponse::Ok().json(stats))
}

pub async fn ready_processing(
    _admin: AdminClaims,
    query: web::Query<PageQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page()?;
    let listing = app_state
        .storage
        .list_orders_admin(AdminView::ReadyProcessing, page)
        .await
        .map_err(|e| ApiError::internal("admin ready list error", e))?;
    Ok(HttpResponse::Ok().json(AdminList::<ReadyRow>::new(listing.total, page, listing.orders)))
}

pub async fn recent_orders(
    _admin: AdminClaims,
    query: web::Query<PageQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page()?;
    let listing = app_state
        .storage
        .list_orders_admin(AdminView::Recent, page)
        .await
        .map_err(|e| ApiError::internal("admin recent list error", e))?;
    Ok(HttpResponse::Ok().json(AdminList::<RecentRow>::new(listing.total, page, listing.orders)))
}

pub async fn admin_order_detail(
    _admin: AdminClaims,
    query: web::Query<IdQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = query.id()?;
    let order = app_state.storage.get_order(id).await?;
    Ok(HttpResponse::Ok().json(OrderEnvelope {
        order: AdminOrderDetail::from(order),
    }))
}

/// Sets any of the five statuses; there is no transition graph.
pub async fn update_order_status(
    admin: AdminClaims,
    data: web::Json<UpdateStatusData>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    if data.id <= 0 {
        return Err(ApiError::bad_request("invalid id"));
    }
    let status = data
        .status
        .parse::<OrderStatus>()
        .map_err(|_| ApiError::bad_request("invalid status"))?;

    let order = app_state
        .storage
        .update_order_status(data.id, status)
        .await?;

    log::info!(
        "Admin {} set order {} to {}",
        admin.0.subject,
        order.id,
        order.status
    );
    Ok(HttpResponse::Ok().json(OrderEnvelope {
        order: AdminOrderDetail::from(order),
    }))
}
