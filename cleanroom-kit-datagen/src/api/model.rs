//! Configuration and report types for the generator entry points.

use chrono::NaiveDate;
use serde::Serialize;

use cleanroom_kit_platform::ids::DatasetId;

/// Where and how large to fabricate the retail source corpus.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub dataset: DatasetId,
    pub user_count: u32,
    pub order_count: u32,
    /// Orders land on the five days centered on this date.
    pub anchor_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub users: usize,
    pub orders: usize,
    pub order_items: usize,
}

/// Inputs of one generation run. The same config against the same source
/// rows reproduces every output byte.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub source_dataset: DatasetId,
    pub merchant_dataset: DatasetId,
    pub wallet_dataset: DatasetId,
    pub as_of_date: NaiveDate,
    /// Shared secret both parties salt their join keys with.
    pub salt: String,
    /// Percentage of base orders the wallet provider observes, 1 to 100.
    pub market_share_percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub as_of_date: NaiveDate,
    pub snapshot_orders: usize,
    pub snapshot_order_items: usize,
    pub merchant_users: usize,
    pub base_orders: usize,
    pub wallet_users: usize,
    pub wallet_transactions: usize,
}

/// Which datasets to cross-check, and the salt they were generated with.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub merchant_dataset: DatasetId,
    pub wallet_dataset: DatasetId,
    pub salt: String,
}

/// Linkage diagnostic over the generated datasets. `passed` requires every
/// check to come back clean on non-empty tables.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub transactions_checked: usize,
    pub unlinked_transactions: usize,
    pub wallet_users_checked: usize,
    pub unmatched_join_keys: usize,
    pub stale_wallet_join_keys: usize,
    pub merchant_users_checked: usize,
    pub stale_merchant_join_keys: usize,
    pub passed: bool,
}
