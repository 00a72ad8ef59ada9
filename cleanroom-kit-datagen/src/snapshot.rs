//! Merchant snapshot: the deterministic, point-in-time extract the rest of
//! the pipeline works from.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{GenerateError, GenerateResult};
use crate::hashing::join_key;
use crate::tables::{MerchantUser, Order, OrderItem, SourceUser};

/// Order statuses that never feed downstream analysis. They stay in the
/// snapshot itself so the merchant's own books remain complete.
const EXCLUDED_STATUSES: &[&str] = &["Cancelled", "Returned"];

/// One settled order joined with its user and line-item total; the unit the
/// synthetic generator samples from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BaseOrder {
    pub order_id: i64,
    pub email: String,
    pub city: String,
    pub status: String,
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub(crate) struct MerchantSnapshot {
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
    pub users: Vec<MerchantUser>,
    pub base_orders: Vec<BaseOrder>,
}

/// Filters the source to `as_of`, de-duplicates users, salts in the join
/// key, and derives the base orders. Output ordering is fixed (orders and
/// items by id, users by user id) no matter how the source rows arrived.
pub(crate) fn build_snapshot(
    source_users: Vec<SourceUser>,
    source_orders: Vec<Order>,
    source_items: Vec<OrderItem>,
    as_of: NaiveDate,
    salt: &str,
) -> GenerateResult<MerchantSnapshot> {
    let mut orders: Vec<Order> = source_orders
        .into_iter()
        .filter(|o| o.created_at.date_naive() == as_of)
        .collect();
    if orders.is_empty() {
        return Err(GenerateError::EmptySourceSet(format!(
            "no orders dated {as_of}"
        )));
    }
    orders.sort_by_key(|o| o.order_id);

    let order_ids: HashSet<i64> = orders.iter().map(|o| o.order_id).collect();
    let mut order_items: Vec<OrderItem> = source_items
        .into_iter()
        .filter(|i| order_ids.contains(&i.order_id))
        .collect();
    order_items.sort_by_key(|i| i.id);

    // Keep only users who placed a snapshot order; for duplicated ids keep
    // the record with the latest created_at, later source rows winning ties.
    let buyer_ids: HashSet<i64> = orders.iter().map(|o| o.user_id).collect();
    let mut deduped: BTreeMap<i64, SourceUser> = BTreeMap::new();
    for user in source_users {
        if !buyer_ids.contains(&user.id) {
            continue;
        }
        match deduped.get(&user.id) {
            Some(existing) if existing.created_at > user.created_at => {}
            _ => {
                deduped.insert(user.id, user);
            }
        }
    }

    let users: Vec<MerchantUser> = deduped
        .into_values()
        .map(|u| MerchantUser {
            hashed_email: join_key(&u.email, salt),
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            city: u.city,
            country: u.country,
            created_at: u.created_at,
        })
        .collect();

    let users_by_id: BTreeMap<i64, &MerchantUser> = users.iter().map(|u| (u.id, u)).collect();

    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for item in &order_items {
        *totals.entry(item.order_id).or_insert(0.0) += item.sale_price;
    }

    let base_orders: Vec<BaseOrder> = orders
        .iter()
        .filter(|o| !EXCLUDED_STATUSES.contains(&o.status.as_str()))
        .filter_map(|o| {
            let user = users_by_id.get(&o.user_id)?;
            let total = totals.get(&o.order_id)?;
            Some(BaseOrder {
                order_id: o.order_id,
                email: user.email.clone(),
                city: user.city.clone(),
                status: o.status.clone(),
                total_price: (total * 100.0).round() / 100.0,
                created_at: o.created_at,
            })
        })
        .collect();

    if base_orders.is_empty() {
        return Err(GenerateError::EmptySourceSet(format!(
            "no settled orders dated {as_of} join to a user and line items"
        )));
    }

    Ok(MerchantSnapshot {
        orders,
        order_items,
        users,
        base_orders,
    })
}
