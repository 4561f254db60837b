use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};

use crate::pagination::Page;
use crate::schema::{Admin, AdminView, NewAdmin, NewOrder, Order, OrderPage, OrderStats, OrderStatus};

/// Bound on admin account lookups.
pub const ADMIN_QUERY_TIMEOUT: Duration = Duration::from_secs(3);
/// Bound on every order read and write.
pub const ORDER_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// The UTC instants bounding `day` on the server's local calendar, as `[start, end)`.
pub fn local_day_window(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let next = day.succ_opt().unwrap_or(NaiveDate::MAX);
    (local_midnight(day), local_midnight(next))
}

fn local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let naive = day.and_time(NaiveTime::MIN);
    naive
        .and_local_timezone(Local)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("duplicate record: {0}")]
    Duplicate(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence used by the HTTP handlers and the CLI.
///
/// Calls are independent: nothing here opens a transaction, and
/// `update_order_status` is an update followed by a separate re-read.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_admin_by_username(&self, username: &str) -> Result<Admin, StoreError>;

    async fn insert_admin(&self, admin: &NewAdmin) -> Result<i64, StoreError>;

    /// Stores a new order for `merchant_name` with status Processing.
    async fn insert_order(&self, merchant_name: &str, order: &NewOrder) -> Result<i64, StoreError>;

    /// The merchant's orders, highest id first.
    async fn list_orders_by_merchant(
        &self,
        merchant_name: &str,
        page: Page,
    ) -> Result<OrderPage, StoreError>;

    /// Returns `NotFound` when the order exists but belongs to someone else.
    async fn get_order_by_merchant(&self, merchant_name: &str, id: i64) -> Result<Order, StoreError>;

    async fn list_orders_admin(&self, view: AdminView, page: Page) -> Result<OrderPage, StoreError>;

    async fn get_order(&self, id: i64) -> Result<Order, StoreError>;

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Order, StoreError>;

    async fn stats(&self) -> Result<OrderStats, StoreError>;
}
