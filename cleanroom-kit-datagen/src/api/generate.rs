use log::info;

use cleanroom_kit_platform::Warehouse;

use crate::api::common::{read_table, write_table};
use crate::api::model::{GenerateConfig, GenerateReport};
use crate::error::{GenerateError, GenerateResult};
use crate::snapshot::build_snapshot;
use crate::synthetic::derive_synthetic;
use crate::tables::{
    merchant_users_schema, order_items_schema, orders_schema, transactions_schema,
    wallet_users_schema, ORDERS_TABLE, ORDER_ITEMS_TABLE, TRANSACTIONS_TABLE, USERS_TABLE,
    WALLET_USERS_TABLE,
};

/// Runs one full generation: merchant snapshot from the source dataset,
/// then the wallet provider's synthetic tables from the snapshot. Both
/// party datasets are fully replaced.
pub async fn generate(
    warehouse: &dyn Warehouse,
    config: &GenerateConfig,
) -> GenerateResult<GenerateReport> {
    if config.salt.is_empty() {
        return Err(GenerateError::InvalidConfig(
            "salt must not be empty".to_string(),
        ));
    }
    if config.market_share_percent == 0 || config.market_share_percent > 100 {
        return Err(GenerateError::InvalidConfig(format!(
            "market share must be between 1 and 100, got {}",
            config.market_share_percent
        )));
    }

    info!("reading source dataset {}", config.source_dataset);
    let source_users = read_table(warehouse, &config.source_dataset, USERS_TABLE).await?;
    let source_orders = read_table(warehouse, &config.source_dataset, ORDERS_TABLE).await?;
    let source_items = read_table(warehouse, &config.source_dataset, ORDER_ITEMS_TABLE).await?;

    let snapshot = build_snapshot(
        source_users,
        source_orders,
        source_items,
        config.as_of_date,
        &config.salt,
    )?;
    info!(
        "snapshot for {}: {} orders, {} items, {} users, {} base orders",
        config.as_of_date,
        snapshot.orders.len(),
        snapshot.order_items.len(),
        snapshot.users.len(),
        snapshot.base_orders.len()
    );

    warehouse.ensure_dataset(&config.merchant_dataset).await?;
    write_table(
        warehouse,
        &config.merchant_dataset,
        ORDERS_TABLE,
        &orders_schema(),
        &snapshot.orders,
    )
    .await?;
    write_table(
        warehouse,
        &config.merchant_dataset,
        ORDER_ITEMS_TABLE,
        &order_items_schema(),
        &snapshot.order_items,
    )
    .await?;
    write_table(
        warehouse,
        &config.merchant_dataset,
        USERS_TABLE,
        &merchant_users_schema(),
        &snapshot.users,
    )
    .await?;

    let synthetic = derive_synthetic(
        &snapshot.base_orders,
        &config.salt,
        config.market_share_percent,
    );
    info!(
        "derived {} wallet users and {} transactions at {}% market share",
        synthetic.wallet_users.len(),
        synthetic.transactions.len(),
        config.market_share_percent
    );

    warehouse.ensure_dataset(&config.wallet_dataset).await?;
    write_table(
        warehouse,
        &config.wallet_dataset,
        WALLET_USERS_TABLE,
        &wallet_users_schema(),
        &synthetic.wallet_users,
    )
    .await?;
    write_table(
        warehouse,
        &config.wallet_dataset,
        TRANSACTIONS_TABLE,
        &transactions_schema(),
        &synthetic.transactions,
    )
    .await?;

    Ok(GenerateReport {
        as_of_date: config.as_of_date,
        snapshot_orders: snapshot.orders.len(),
        snapshot_order_items: snapshot.order_items.len(),
        merchant_users: snapshot.users.len(),
        base_orders: snapshot.base_orders.len(),
        wallet_users: synthetic.wallet_users.len(),
        wallet_transactions: synthetic.transactions.len(),
    })
}
