use std::future::Future;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::Local;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions, MySqlSslMode};
use sqlx::{MySql, MySqlPool, QueryBuilder};

use crate::pagination::Page;
use crate::schema::{Admin, AdminView, NewAdmin, NewOrder, Order, OrderPage, OrderStats, OrderStatus};
use crate::storage::{ADMIN_QUERY_TIMEOUT, ORDER_QUERY_TIMEOUT, Storage, StoreError, local_day_window};

pub const DEFAULT_MYSQL_PARAMS: &str = "charset=utf8mb4";

const ORDER_COLUMNS: &str = "id, merchant_name, transaction_network, transaction_asset, txid, amount, \
     beneficiary_name, bank_country, bank_name, iban, swift, reference_note, status, created_at, updated_at";

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS admin_users (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        username VARCHAR(64) NOT NULL UNIQUE,
        email VARCHAR(128) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS customer_users (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        name VARCHAR(128) NOT NULL,
        email VARCHAR(128) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id BIGINT AUTO_INCREMENT PRIMARY KEY,
        merchant_name VARCHAR(128) NOT NULL,
        transaction_network ENUM('TRON', 'BSC', 'Ethereum') NOT NULL,
        transaction_asset ENUM('USDT', 'USDC') NOT NULL,
        txid VARCHAR(128) NOT NULL,
        amount DECIMAL(18, 8) NULL,
        beneficiary_name VARCHAR(128) NOT NULL,
        bank_country ENUM('Canada', 'United States') NOT NULL,
        bank_name VARCHAR(128) NOT NULL,
        iban VARCHAR(64) NOT NULL,
        swift VARCHAR(64) NOT NULL,
        reference_note TEXT NULL,
        status ENUM('Paid', 'Processing', 'Summitted', 'Failed', 'Funds Received') NOT NULL DEFAULT 'Processing',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
    ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
    "#,
];

/// Connection settings read from the `MYSQL_*` variables.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub params: String,
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`, reporting every missing variable at once.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let missing: Vec<&str> = ["MYSQL_HOST", "MYSQL_PORT", "MYSQL_USER", "MYSQL_PASSWORD", "MYSQL_DB"]
            .into_iter()
            .filter(|key| get(*key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("missing env vars: {}", missing.join(", ")));
        }

        let port = get("MYSQL_PORT")
            .unwrap_or_default()
            .parse::<u16>()
            .context("MYSQL_PORT must be a valid port number")?;

        Ok(Self {
            host: get("MYSQL_HOST").unwrap_or_default(),
            port,
            user: get("MYSQL_USER").unwrap_or_default(),
            password: get("MYSQL_PASSWORD").unwrap_or_default(),
            name: get("MYSQL_DB").unwrap_or_default(),
            params: get("MYSQL_PARAMS").unwrap_or_else(|| DEFAULT_MYSQL_PARAMS.to_string()),
        })
    }

    pub fn connect_options(&self) -> anyhow::Result<MySqlConnectOptions> {
        let mut options = MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name);

        for pair in self.params.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("MYSQL_PARAMS entry `{pair}` is not key=value"))?;
            options = match key {
                "charset" => options.charset(value),
                "collation" => options.collation(value),
                "timezone" | "time-zone" => options.timezone(Some(value.to_string())),
                "ssl-mode" | "sslmode" => options.ssl_mode(
                    value
                        .parse::<MySqlSslMode>()
                        .map_err(|e| anyhow!("invalid ssl-mode `{value}`: {e}"))?,
                ),
                _ => {
                    log::warn!("Ignoring unsupported MYSQL_PARAMS entry `{key}`");
                    options
                }
            };
        }
        Ok(options)
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

pub struct Database {
    pool: MySqlPool,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> anyhow::Result<Self> {
        let options = config
            .connect_options()
            .context("Failed to create MySQL connect options")?;
        let pool = MySqlPoolOptions::new()
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to MySQL at {}:{}", config.host, config.port))?;
        Ok(Self { pool })
    }

    /// Creates the admin, customer and order tables when they are absent.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            bounded(ORDER_QUERY_TIMEOUT, sqlx::query(statement).execute(&self.pool))
                .await
                .context("Failed to create tables")?;
        }
        Ok(())
    }
}

/// Runs `fut` under `limit`, turning an elapsed deadline into `StoreError::Timeout`.
async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

#[async_trait]
impl Storage for Database {
    async fn get_admin_by_username(&self, username: &str) -> Result<Admin, StoreError> {
        bounded(
            ADMIN_QUERY_TIMEOUT,
            sqlx::query_as::<_, Admin>(
                r#"
                SELECT id, username, email, password_hash, created_at, updated_at
                FROM admin_users
                WHERE username = ?
                LIMIT 1
                "#,
            )
            .bind(username)
            .fetch_optional(&self.pool),
        )
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn insert_admin(&self, admin: &NewAdmin) -> Result<i64, StoreError> {
        let result = bounded(
            ADMIN_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                INSERT INTO admin_users (username, email, password_hash)
                VALUES (?, ?, ?)
                "#,
            )
            .bind(&admin.username)
            .bind(&admin.email)
            .bind(&admin.password_hash)
            .execute(&self.pool),
        )
        .await
        .map_err(|e| match e {
            StoreError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                StoreError::Duplicate(admin.username.clone())
            }
            other => other,
        })?;
        Ok(result.last_insert_id() as i64)
    }

    async fn insert_order(&self, merchant_name: &str, order: &NewOrder) -> Result<i64, StoreError> {
        let result = bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                INSERT INTO orders (
                    merchant_name, transaction_network, transaction_asset, txid, amount,
                    beneficiary_name, bank_country, bank_name, iban, swift, reference_note, status
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(merchant_name)
            .bind(order.transaction_network.as_str())
            .bind(order.transaction_asset.as_str())
            .bind(&order.txid)
            .bind(order.amount)
            .bind(&order.beneficiary_name)
            .bind(order.bank_country.as_str())
            .bind(&order.bank_name)
            .bind(&order.iban)
            .bind(&order.swift)
            .bind(order.reference_note.as_deref())
            .bind(OrderStatus::Processing.as_str())
            .execute(&self.pool),
        )
        .await?;
        Ok(result.last_insert_id() as i64)
    }

    async fn list_orders_by_merchant(
        &self,
        merchant_name: &str,
        page: Page,
    ) -> Result<OrderPage, StoreError> {
        let total: i64 = bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE merchant_name = ?")
                .bind(merchant_name)
                .fetch_one(&self.pool),
        )
        .await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE merchant_name = "));
        query.push_bind(merchant_name);
        query.push(" ORDER BY id DESC");
        push_page(&mut query, page);

        let orders = bounded(
            ORDER_QUERY_TIMEOUT,
            query.build_query_as::<Order>().fetch_all(&self.pool),
        )
        .await?;

        Ok(OrderPage {
            total,
            orders: orders.into_iter().map(Order::normalized).collect(),
        })
    }

    async fn get_order_by_merchant(&self, merchant_name: &str, id: i64) -> Result<Order, StoreError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE merchant_name = ? AND id = ? LIMIT 1");
        bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query_as::<_, Order>(&sql)
                .bind(merchant_name)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await?
        .map(Order::normalized)
        .ok_or(StoreError::NotFound)
    }

    async fn list_orders_admin(&self, view: AdminView, page: Page) -> Result<OrderPage, StoreError> {
        let (filter, order_by) = match view {
            AdminView::Recent => ("", " ORDER BY updated_at DESC, id DESC"),
            AdminView::ReadyProcessing => (" WHERE status = 'Processing'", " ORDER BY created_at DESC, id DESC"),
        };

        let total: i64 = bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM orders{filter}")).fetch_one(&self.pool),
        )
        .await?;

        let mut query = QueryBuilder::<MySql>::new(format!("SELECT {ORDER_COLUMNS} FROM orders{filter}{order_by}"));
        push_page(&mut query, page);

        let orders = bounded(
            ORDER_QUERY_TIMEOUT,
            query.build_query_as::<Order>().fetch_all(&self.pool),
        )
        .await?;

        Ok(OrderPage {
            total,
            orders: orders.into_iter().map(Order::normalized).collect(),
        })
    }

    async fn get_order(&self, id: i64) -> Result<Order, StoreError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? LIMIT 1");
        bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query_as::<_, Order>(&sql).bind(id).fetch_optional(&self.pool),
        )
        .await?
        .map(Order::normalized)
        .ok_or(StoreError::NotFound)
    }

    async fn update_order_status(&self, id: i64, status: OrderStatus) -> Result<Order, StoreError> {
        bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query(
                r#"
                UPDATE orders
                SET status = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
            )
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool),
        )
        .await?;

        // MySQL reports zero affected rows when the status was already set,
        // so existence is decided by the re-read.
        self.get_order(id).await
    }

    async fn stats(&self) -> Result<OrderStats, StoreError> {
        let count_status = |status: OrderStatus| async move {
            bounded(
                ORDER_QUERY_TIMEOUT,
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders WHERE status = ?")
                    .bind(status.as_str())
                    .fetch_one(&self.pool),
            )
            .await
        };

        // Bound by instants, not DATE(created_at): the session time zone is UTC.
        let (start, end) = local_day_window(Local::now().date_naive());
        let completed_today = bounded(
            ORDER_QUERY_TIMEOUT,
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM orders WHERE status = ? AND created_at >= ? AND created_at < ?",
            )
            .bind(OrderStatus::Paid.as_str())
            .bind(start)
            .bind(end)
            .fetch_one(&self.pool),
        )
        .await?;

        Ok(OrderStats {
            funds_received: count_status(OrderStatus::FundsReceived).await?,
            processing: count_status(OrderStatus::Processing).await?,
            action_required: count_status(OrderStatus::Failed).await?,
            awaiting: count_status(OrderStatus::Submitted).await?,
            completed_today,
        })
    }
}

fn push_page(query: &mut QueryBuilder<'_, MySql>, page: Page) {
    query.push(" LIMIT ");
    query.push_bind(page.limit());
    query.push(" OFFSET ");
    query.push_bind(page.offset());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn reads_all_mysql_settings() {
        let vars = env(&[
            ("MYSQL_HOST", "db.internal"),
            ("MYSQL_PORT", "3307"),
            ("MYSQL_USER", "settle"),
            ("MYSQL_PASSWORD", "p@ss"),
            ("MYSQL_DB", "orders"),
        ]);
        let config = DatabaseConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert_eq!(config.port, 3307);
        assert_eq!(config.params, DEFAULT_MYSQL_PARAMS);
        assert!(config.connect_options().is_ok());
        assert!(!format!("{config:?}").contains("p@ss"));
    }

    #[test]
    fn reports_every_missing_variable() {
        let vars = env(&[("MYSQL_HOST", "db"), ("MYSQL_DB", "")]);
        let err = DatabaseConfig::from_lookup(|k| vars.get(k).cloned()).unwrap_err();
        let message = err.to_string();
        for key in ["MYSQL_PORT", "MYSQL_USER", "MYSQL_PASSWORD", "MYSQL_DB"] {
            assert!(message.contains(key), "{message}");
        }
        assert!(!message.contains("MYSQL_HOST"));
    }

    #[test]
    fn malformed_port_is_rejected() {
        let vars = env(&[
            ("MYSQL_HOST", "db"),
            ("MYSQL_PORT", "not-a-port"),
            ("MYSQL_USER", "u"),
            ("MYSQL_PASSWORD", "p"),
            ("MYSQL_DB", "d"),
        ]);
        assert!(DatabaseConfig::from_lookup(|k| vars.get(k).cloned()).is_err());
    }

    #[test]
    fn params_are_parsed() {
        let vars = env(&[
            ("MYSQL_HOST", "db"),
            ("MYSQL_PORT", "3306"),
            ("MYSQL_USER", "u"),
            ("MYSQL_PASSWORD", "p"),
            ("MYSQL_DB", "d"),
            ("MYSQL_PARAMS", "charset=utf8mb4&parseTime=True&ssl-mode=disabled"),
        ]);
        let config = DatabaseConfig::from_lookup(|k| vars.get(k).cloned()).unwrap();
        assert!(config.connect_options().is_ok());

        let broken = DatabaseConfig {
            params: "charset".into(),
            ..config
        };
        assert!(broken.connect_options().is_err());
    }
}
