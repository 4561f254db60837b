use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, Utc};
use tokio::sync::RwLock;

use crate::pagination::Page;
use crate::schema::{Admin, AdminView, NewAdmin, NewOrder, Order, OrderPage, OrderStats, OrderStatus};
use crate::storage::{Storage, StoreError, local_day_window};

#[derive(Default)]
struct Tables {
    admins: BTreeMap<i64, Admin>,
    orders: BTreeMap<i64, Order>,
}

/// A thread-safe in-memory `Storage`.
///
/// Mirrors the MySQL ordering and scoping rules so handlers can be exercised
/// without a database.
#[derive(Default, Clone)]
pub struct InMemoryStorage {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate(mut orders: Vec<Order>, page: Page) -> OrderPage {
    let total = orders.len() as i64;
    let start = page.offset().min(total) as usize;
    let end = (page.offset().saturating_add(page.limit())).min(total) as usize;
    OrderPage {
        total,
        orders: orders.drain(start..end).collect(),
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_admin_by_username(&self, username: &str) -> Result<Admin, StoreError> {
        let tables = self.tables.read().await;
        tables
            .admins
            .values()
            .find(|a| a.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert_admin(&self, admin: &NewAdmin) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.admins.values().any(|a| a.username == admin.username) {
            return Err(StoreError::Duplicate(admin.username.clone()));
        }
        let id = tables.admins.keys().next_back().map_or(1, |last| last + 1);
        let now = Utc::now();
        tables.admins.insert(
            id,
            Admin {
                id,
                username: admin.username.clone(),
                email: admin.email.clone(),
                password_hash: admin.password_hash.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn insert_order(&self, merchant_name: &str, order: &NewOrder) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.orders.keys().next_back().map_or(1, |last| last + 1);
        tables
            .orders
            .insert(id, Order::from_new(id, merchant_name, order.clone(), Utc::now()));
        Ok(id)
    }

    async fn list_orders_by_merchant(
        &self,
        merchant_name: &str,
        page: Page,
    ) -> Result<OrderPage, StoreError> {
        let tables = self.tables.read().await;
        let orders: Vec<Order> = tables
            .orders
            .values()
            .rev()
            .filter(|o| o.merchant_name == merchant_name)
            .cloned()
            .collect();
        Ok(paginate(orders, page))
    }

    async fn get_order_by_merchant(&self, merchant_name: &str, id: i64) -> Result<Order, StoreError> {
        let tables = self.tables.read().await;
        tables
            .orders
            .get(&id)
            .filter(|o| o.merchant_name == merchant_name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_orders_admin(&self, view: AdminView, page: Page) -> Result<OrderPage, StoreError> {
        let tables = self.tables.read().await;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| view == AdminView::Recent || o.status == OrderStatus::Processing)
            .cloned()
            .collect();
        match view {
            AdminView::Recent => orders.sort_by_key(|o| Reverse((o.updated_at, o.id))),
            AdminView::ReadyProcessing => orders.sort_by_key(|o| Reverse((o.created_at, o.id))),
        }
        Ok(paginate(orders, page))
    }

    async fn get_order(&self, id: i64) -> Result<Order, StoreError> {
        let tables = self.tables.read().await;
        tables.orders.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Order, StoreError> {
        let mut tables = self.tables.write().await;
        let order = tables.orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        order.status = status;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    async fn stats(&self) -> Result<OrderStats, StoreError> {
        let tables = self.tables.read().await;
        let (start, end) = local_day_window(Local::now().date_naive());
        let mut stats = OrderStats::default();
        for order in tables.orders.values() {
            match order.status {
                OrderStatus::FundsReceived => stats.funds_received += 1,
                OrderStatus::Processing => stats.processing += 1,
                OrderStatus::Failed => stats.action_required += 1,
                OrderStatus::Submitted => stats.awaiting += 1,
                OrderStatus::Paid => {
                    if order.created_at >= start && order.created_at < end {
                        stats.completed_today += 1;
                    }
                }
            }
        }
        Ok(stats)
    }
}
