use log::info;

use cleanroom_kit_platform::Warehouse;

use crate::api::common::write_table;
use crate::api::model::{SeedConfig, SeedReport};
use crate::error::{GenerateError, GenerateResult};
use crate::source::build_corpus;
use crate::tables::{
    order_items_schema, orders_schema, users_schema, ORDERS_TABLE, ORDER_ITEMS_TABLE, USERS_TABLE,
};

/// Fabricates the retail source corpus and writes it to the source
/// dataset, replacing whatever was there.
pub async fn seed(warehouse: &dyn Warehouse, config: &SeedConfig) -> GenerateResult<SeedReport> {
    if config.user_count == 0 {
        return Err(GenerateError::InvalidConfig(
            "user count must be at least 1".to_string(),
        ));
    }
    if config.order_count == 0 {
        return Err(GenerateError::InvalidConfig(
            "order count must be at least 1".to_string(),
        ));
    }

    info!(
        "seeding source corpus into {} ({} users, {} orders around {})",
        config.dataset, config.user_count, config.order_count, config.anchor_date
    );
    let corpus = build_corpus(config.user_count, config.order_count, config.anchor_date);

    warehouse.ensure_dataset(&config.dataset).await?;
    write_table(
        warehouse,
        &config.dataset,
        USERS_TABLE,
        &users_schema(),
        &corpus.users,
    )
    .await?;
    write_table(
        warehouse,
        &config.dataset,
        ORDERS_TABLE,
        &orders_schema(),
        &corpus.orders,
    )
    .await?;
    write_table(
        warehouse,
        &config.dataset,
        ORDER_ITEMS_TABLE,
        &order_items_schema(),
        &corpus.order_items,
    )
    .await?;

    Ok(SeedReport {
        users: corpus.users.len(),
        orders: corpus.orders.len(),
        order_items: corpus.order_items.len(),
    })
}
