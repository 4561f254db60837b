//! JSON projections of `Order` for each endpoint.

use chrono::{DateTime, Utc};
use common::{BankCountry, Order, OrderStatus, Page, TransactionAsset, TransactionNetwork};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub id: i64,
    pub transaction_network: TransactionNetwork,
    pub transaction_asset: TransactionAsset,
    pub txid: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub beneficiary_name: String,
    pub bank_country: BankCountry,
    pub bank_name: String,
    pub iban: String,
    pub swift: String,
    pub reference_note: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for CustomerOrder {
    fn from(o: Order) -> Self {
        CustomerOrder {
            id: o.id,
            transaction_network: o.transaction_network,
            transaction_asset: o.transaction_asset,
            txid: o.txid,
            amount: o.amount,
            beneficiary_name: o.beneficiary_name,
            bank_country: o.bank_country,
            bank_name: o.bank_name,
            iban: o.iban,
            swift: o.swift,
            reference_note: o.reference_note,
            status: o.status,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminOrderDetail {
    pub order_id: i64,
    pub merchant_name: String,
    pub transaction_network: TransactionNetwork,
    pub transaction_asset: TransactionAsset,
    pub txid: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub beneficiary_name: String,
    pub bank_country: BankCountry,
    pub bank_name: String,
    pub iban: String,
    pub swift: String,
    pub reference_note: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for AdminOrderDetail {
    fn from(o: Order) -> Self {
        AdminOrderDetail {
            order_id: o.id,
            merchant_name: o.merchant_name,
            transaction_network: o.transaction_network,
            transaction_asset: o.transaction_asset,
            txid: o.txid,
            amount: o.amount,
            beneficiary_name: o.beneficiary_name,
            bank_country: o.bank_country,
            bank_name: o.bank_name,
            iban: o.iban,
            swift: o.swift,
            reference_note: o.reference_note,
            status: o.status,
            created_at: o.created_at,
        }
    }
}

/// A row of the "ready for processing" queue.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadyRow {
    pub order_id: i64,
    pub merchant_name: String,
    pub asset: TransactionAsset,
    pub network: TransactionNetwork,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub time_received: DateTime<Utc>,
}

impl From<Order> for ReadyRow {
    fn from(o: Order) -> Self {
        ReadyRow {
            order_id: o.id,
            merchant_name: o.merchant_name,
            asset: o.transaction_asset,
            network: o.transaction_network,
            amount: o.amount,
            time_received: o.created_at,
        }
    }
}

/// A row of the recent activity feed.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecentRow {
    pub order_id: i64,
    pub status: OrderStatus,
    pub merchant_name: String,
    pub network: TransactionNetwork,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub asset: TransactionAsset,
    pub last_update: DateTime<Utc>,
}

impl From<Order> for RecentRow {
    fn from(o: Order) -> Self {
        RecentRow {
            order_id: o.id,
            status: o.status,
            merchant_name: o.merchant_name,
            network: o.transaction_network,
            amount: o.amount,
            asset: o.transaction_asset,
            last_update: o.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminList<T> {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub items: Vec<T>,
}

impl<T: From<Order>> AdminList<T> {
    pub fn new(total: i64, page: Page, orders: Vec<Order>) -> Self {
        AdminList {
            total,
            page: page.page,
            page_size: page.page_size,
            items: orders.into_iter().map(T::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerOrderList {
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub orders: Vec<CustomerOrder>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderEnvelope<T> {
    pub order: T,
}
