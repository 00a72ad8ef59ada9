use std::collections::HashSet;

use log::{info, warn};

use cleanroom_kit_platform::Warehouse;

use crate::api::common::read_table;
use crate::api::model::{VerifyConfig, VerifyReport};
use crate::error::GenerateResult;
use crate::hashing::join_key;
use crate::tables::{
    MerchantUser, Order, WalletTransaction, WalletUser, ORDERS_TABLE, TRANSACTIONS_TABLE,
    USERS_TABLE, WALLET_USERS_TABLE,
};

/// Cross-checks the generated datasets: every wallet transaction must
/// reference a snapshot order, every wallet join key must appear on the
/// merchant side, and stored join keys must match a recomputation under
/// the given salt.
pub async fn verify(warehouse: &dyn Warehouse, config: &VerifyConfig) -> GenerateResult<VerifyReport> {
    let orders: Vec<Order> = read_table(warehouse, &config.merchant_dataset, ORDERS_TABLE).await?;
    let merchant_users: Vec<MerchantUser> =
        read_table(warehouse, &config.merchant_dataset, USERS_TABLE).await?;
    let wallet_users: Vec<WalletUser> =
        read_table(warehouse, &config.wallet_dataset, WALLET_USERS_TABLE).await?;
    let transactions: Vec<WalletTransaction> =
        read_table(warehouse, &config.wallet_dataset, TRANSACTIONS_TABLE).await?;

    let order_ids: HashSet<i64> = orders.iter().map(|o| o.order_id).collect();
    let unlinked_transactions = transactions
        .iter()
        .filter(|t| !order_ids.contains(&t.order_id))
        .count();

    let merchant_keys: HashSet<&str> = merchant_users
        .iter()
        .map(|u| u.hashed_email.as_str())
        .collect();
    let unmatched_join_keys = wallet_users
        .iter()
        .filter(|u| !merchant_keys.contains(u.hashed_email.as_str()))
        .count();

    let stale_wallet_join_keys = wallet_users
        .iter()
        .filter(|u| join_key(&u.email, &config.salt) != u.hashed_email)
        .count();
    let stale_merchant_join_keys = merchant_users
        .iter()
        .filter(|u| join_key(&u.email, &config.salt) != u.hashed_email)
        .count();

    let non_empty = !transactions.is_empty() && !wallet_users.is_empty();
    let passed = non_empty
        && unlinked_transactions == 0
        && unmatched_join_keys == 0
        && stale_wallet_join_keys == 0
        && stale_merchant_join_keys == 0;

    if passed {
        info!(
            "verification passed: {} transactions linked, {} join keys matched",
            transactions.len(),
            wallet_users.len()
        );
    } else {
        warn!(
            "verification failed: {unlinked_transactions} unlinked transactions, \
             {unmatched_join_keys} unmatched join keys, \
             {stale_wallet_join_keys}+{stale_merchant_join_keys} stale join keys"
        );
    }

    Ok(VerifyReport {
        transactions_checked: transactions.len(),
        unlinked_transactions,
        wallet_users_checked: wallet_users.len(),
        unmatched_join_keys,
        stale_wallet_join_keys,
        merchant_users_checked: merchant_users.len(),
        stale_merchant_join_keys,
        passed,
    })
}
