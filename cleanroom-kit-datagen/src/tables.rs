//! Row types and schemas for every table the generator reads or writes.
//!
//! The same `orders`/`order_items`/`users` shapes serve both the retail
//! source dataset and the merchant snapshot; the snapshot user table adds
//! the salted join key. Rows cross the warehouse boundary as JSON objects,
//! so each type round-trips through [`Row`] with serde.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use cleanroom_kit_platform::ids::TableId;
use cleanroom_kit_platform::schema::{ColumnSpec, ColumnType, Row, TableSchema};

use crate::error::{GenerateError, GenerateResult};

pub const ORDERS_TABLE: &str = "orders";
pub const ORDER_ITEMS_TABLE: &str = "order_items";
pub const USERS_TABLE: &str = "users";
pub const WALLET_USERS_TABLE: &str = "wallet_users";
pub const TRANSACTIONS_TABLE: &str = "transactions";

pub const HASHED_EMAIL_COLUMN: &str = "hashed_email";
pub const ORDER_ID_COLUMN: &str = "order_id";

/// A retail customer as the source system stores it. Ids repeat when a
/// customer re-registers; the snapshot de-duplicates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// An order header. `status` uses the source system's vocabulary
/// (`Complete`, `Shipped`, `Processing`, `Cancelled`, `Returned`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub user_id: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub num_of_item: i64,
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub sale_price: f64,
    pub status: String,
}

/// A snapshot user: the de-duplicated source user plus the join key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerchantUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub hashed_email: String,
}

/// Subscription level of a synthetic wallet account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountTier {
    Free,
    Premium,
    Business,
}

/// A synthetic wallet-provider account. Identified by a provider-local id;
/// linked to the merchant only through `hashed_email`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletUser {
    pub wallet_user_id: i64,
    pub email: String,
    pub hashed_email: String,
    pub date_of_birth: NaiveDate,
    pub city: String,
    pub account_tier: AccountTier,
    pub is_verified_user: bool,
}

/// A synthetic wallet payment for one merchant order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub transaction_id: String,
    pub order_id: i64,
    pub wallet_user_id: i64,
    pub transaction_amount: f64,
    pub transaction_timestamp: DateTime<Utc>,
    pub status: String,
}

pub fn users_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnSpec::new("id", ColumnType::Int64),
        ColumnSpec::new("email", ColumnType::String),
        ColumnSpec::new("first_name", ColumnType::String),
        ColumnSpec::new("last_name", ColumnType::String),
        ColumnSpec::new("city", ColumnType::String),
        ColumnSpec::new("country", ColumnType::String),
        ColumnSpec::new("created_at", ColumnType::Timestamp),
    ])
}

pub fn orders_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnSpec::new("order_id", ColumnType::Int64),
        ColumnSpec::new("user_id", ColumnType::Int64),
        ColumnSpec::new("status", ColumnType::String),
        ColumnSpec::new("created_at", ColumnType::Timestamp),
        ColumnSpec::new("num_of_item", ColumnType::Int64),
    ])
}

pub fn order_items_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnSpec::new("id", ColumnType::Int64),
        ColumnSpec::new("order_id", ColumnType::Int64),
        ColumnSpec::new("user_id", ColumnType::Int64),
        ColumnSpec::new("product_id", ColumnType::Int64),
        ColumnSpec::new("sale_price", ColumnType::Float64),
        ColumnSpec::new("status", ColumnType::String),
    ])
}

pub fn merchant_users_schema() -> TableSchema {
    let mut schema = users_schema();
    schema.columns.push(
        ColumnSpec::new(HASHED_EMAIL_COLUMN, ColumnType::String)
            .with_description("Salted SHA-256 of email, base64 encoded; the cross-party join key"),
    );
    schema
}

pub fn wallet_users_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnSpec::new("wallet_user_id", ColumnType::Int64),
        ColumnSpec::new("email", ColumnType::String),
        ColumnSpec::new(HASHED_EMAIL_COLUMN, ColumnType::String)
            .with_description("Salted SHA-256 of email, base64 encoded; the cross-party join key"),
        ColumnSpec::new("date_of_birth", ColumnType::Date),
        ColumnSpec::new("city", ColumnType::String),
        ColumnSpec::new("account_tier", ColumnType::String),
        ColumnSpec::new("is_verified_user", ColumnType::Bool),
    ])
}

pub fn transactions_schema() -> TableSchema {
    TableSchema::new(vec![
        ColumnSpec::new("transaction_id", ColumnType::String),
        ColumnSpec::new(ORDER_ID_COLUMN, ColumnType::Int64)
            .with_description("Merchant order this payment settled"),
        ColumnSpec::new("wallet_user_id", ColumnType::Int64),
        ColumnSpec::new("transaction_amount", ColumnType::Float64),
        ColumnSpec::new("transaction_timestamp", ColumnType::Timestamp),
        ColumnSpec::new("status", ColumnType::String),
    ])
}

pub(crate) fn to_row<T: Serialize>(value: &T) -> GenerateResult<Row> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(GenerateError::MalformedRow(format!(
            "expected an object row, got {other}"
        ))),
        Err(e) => Err(GenerateError::MalformedRow(e.to_string())),
    }
}

pub(crate) fn to_rows<T: Serialize>(values: &[T]) -> GenerateResult<Vec<Row>> {
    values.iter().map(to_row).collect()
}

pub(crate) fn from_rows<T: DeserializeOwned>(
    table: &TableId,
    rows: Vec<Row>,
) -> GenerateResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(serde_json::Value::Object(row))
                .map_err(|e| GenerateError::MalformedRow(format!("{table}: {e}")))
        })
        .collect()
}
