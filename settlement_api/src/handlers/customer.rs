use actix_web::{HttpResponse, web};
use common::OrderDraft;
use serde::{Deserialize, Serialize};

use super::{IdQuery, PageQuery};
use crate::error::ApiError;
use crate::extractors::Merchant;
use crate::state::AppState;
use crate::views::{CustomerOrder, CustomerOrderList, OrderEnvelope};

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: i64,
}

pub async fn create_order(
    merchant: Merchant,
    draft: web::Json<OrderDraft>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let order = draft.into_inner().validate().map_err(ApiError::bad_request)?;

    let id = app_state
        .storage
        .insert_order(&merchant.0, &order)
        .await
        .map_err(|e| ApiError::internal("create order error", e))?;

    log::info!("Merchant {} created order {}", merchant.0, id);
    Ok(HttpResponse::Created().json(CreatedOrder { id }))
}

pub async fn list_customer_orders(
    merchant: Merchant,
    query: web::Query<PageQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page()?;
    let listing = app_state
        .storage
        .list_orders_by_merchant(&merchant.0, page)
        .await
        .map_err(|e| ApiError::internal("list orders error", e))?;

    Ok(HttpResponse::Ok().json(CustomerOrderList {
        total: listing.total,
        page: page.page,
        page_size: page.page_size,
        orders: listing.orders.into_iter().map(CustomerOrder::from).collect(),
    }))
}

pub async fn get_customer_order(
    merchant: Merchant,
    query: web::Query<IdQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let id = query.id()?;
    let order = app_state
        .storage
        .get_order_by_merchant(&merchant.0, id)
        .await?;
    Ok(HttpResponse::Ok().json(OrderEnvelope {
        order: CustomerOrder::from(order),
    }))
}
