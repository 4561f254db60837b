use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Returned when a string does not name a variant of one of the order enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {value:?}")]
pub struct ParseEnumError {
    pub field: &'static str,
    pub value: String,
}

/// Declares a closed set of wire values stored in a MySQL ENUM column.
macro_rules! wire_enum {
    ($name:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

wire_enum!(TransactionNetwork, "transaction_network", {
    Tron => "TRON",
    Bsc => "BSC",
    Ethereum => "Ethereum",
});

wire_enum!(TransactionAsset, "transaction_asset", {
    Usdt => "USDT",
    Usdc => "USDC",
});

wire_enum!(BankCountry, "bank_country", {
    Canada => "Canada",
    UnitedStates => "United States",
});

// "Summitted" is the spelling persisted in the orders.status ENUM.
wire_enum!(OrderStatus, "status", {
    Processing => "Processing",
    Paid => "Paid",
    Submitted => "Summitted",
    Failed => "Failed",
    FundsReceived => "Funds Received",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub merchant_name: String,
    #[sqlx(try_from = "String")]
    pub transaction_network: TransactionNetwork,
    #[sqlx(try_from = "String")]
    pub transaction_asset: TransactionAsset,
    pub txid: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    pub beneficiary_name: String,
    #[sqlx(try_from = "String")]
    pub bank_country: BankCountry,
    pub bank_name: String,
    pub iban: String,
    pub swift: String,
    pub reference_note: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a freshly submitted order. Only the in-memory storage uses this;
    /// MySQL assigns id and timestamps itself.
    pub fn from_new(id: i64, merchant_name: &str, new: NewOrder, now: DateTime<Utc>) -> Self {
        Order {
            id,
            merchant_name: merchant_name.to_string(),
            transaction_network: new.transaction_network,
            transaction_asset: new.transaction_asset,
            txid: new.txid,
            amount: new.amount,
            beneficiary_name: new.beneficiary_name,
            bank_country: new.bank_country,
            bank_name: new.bank_name,
            iban: new.iban,
            swift: new.swift,
            reference_note: new.reference_note,
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    /// Drops a stored note that is only whitespace.
    pub fn normalized(mut self) -> Self {
        self.reference_note = self.reference_note.and_then(non_blank);
        self
    }
}

/// Order fields as submitted by a customer, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub transaction_network: String,
    #[serde(default)]
    pub transaction_asset: String,
    #[serde(default)]
    pub txid: String,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub beneficiary_name: String,
    #[serde(default)]
    pub bank_country: String,
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub iban: String,
    #[serde(default)]
    pub swift: String,
    #[serde(default)]
    pub reference_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("missing required fields")]
    MissingFields,
    #[error("invalid {}", .0.field)]
    InvalidEnum(#[from] ParseEnumError),
    #[error("amount must be non-negative")]
    NegativeAmount,
}

/// A validated order ready to be inserted with status Processing.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub transaction_network: TransactionNetwork,
    pub transaction_asset: TransactionAsset,
    pub txid: String,
    pub amount: Option<Decimal>,
    pub beneficiary_name: String,
    pub bank_country: BankCountry,
    pub bank_name: String,
    pub iban: String,
    pub swift: String,
    pub reference_note: Option<String>,
}

impl OrderDraft {
    pub fn validate(self) -> Result<NewOrder, OrderValidationError> {
        let required = [
            &self.transaction_network,
            &self.transaction_asset,
            &self.txid,
            &self.beneficiary_name,
            &self.bank_country,
            &self.bank_name,
            &self.iban,
            &self.swift,
        ];
        if required.iter().any(|field| field.is_empty()) {
            return Err(OrderValidationError::MissingFields);
        }

        let transaction_network = self.transaction_network.parse::<TransactionNetwork>()?;
        let transaction_asset = self.transaction_asset.parse::<TransactionAsset>()?;
        let bank_country = self.bank_country.parse::<BankCountry>()?;

        if self.amount.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(OrderValidationError::NegativeAmount);
        }

        Ok(NewOrder {
            transaction_network,
            transaction_asset,
            txid: self.txid,
            amount: self.amount,
            beneficiary_name: self.beneficiary_name,
            bank_country,
            bank_name: self.bank_name,
            iban: self.iban,
            swift: self.swift,
            reference_note: self.reference_note.and_then(non_blank),
        })
    }
}

fn non_blank(note: String) -> Option<String> {
    if note.trim().is_empty() { None } else { Some(note) }
}

/// Dashboard counters shown on the admin landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub funds_received: i64,
    pub processing: i64,
    pub action_required: i64,
    pub awaiting: i64,
    pub completed_today: i64,
}

/// The two admin list views over all merchants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    /// Every order, most recently updated first.
    Recent,
    /// Orders still in Processing, newest first.
    ReadyProcessing,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPage {
    pub total: i64,
    pub orders: Vec<Order>,
}
