//! Synthetic wallet-provider records derived from the merchant's base
//! orders.
//!
//! The provider sees a market-share sample of the orders, decided per
//! order id so the sample is stable across runs and salts. Account
//! attributes are drawn from the email's digest stream, which keeps them
//! identical under a salt change while the join keys all move.

use std::collections::HashMap;

use chrono::{NaiveDate, TimeDelta};
use uuid::Uuid;

use crate::hashing::{derive_u64, join_key};
use crate::snapshot::BaseOrder;
use crate::tables::{AccountTier, WalletTransaction, WalletUser};

// Days from 1950-01-01 up to 2005-12-30, the date-of-birth range.
const DOB_RANGE_DAYS: u64 = 20_453;

pub(crate) struct SyntheticData {
    pub wallet_users: Vec<WalletUser>,
    pub transactions: Vec<WalletTransaction>,
}

fn sampled(order_id: i64, market_share_percent: u8) -> bool {
    derive_u64(&["share", &order_id.to_string()]) % 100 < u64::from(market_share_percent)
}

fn date_of_birth(email: &str) -> NaiveDate {
    let start = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap_or(NaiveDate::MIN);
    start + TimeDelta::days((derive_u64(&["dob", email]) % DOB_RANGE_DAYS) as i64)
}

fn account_tier(email: &str) -> AccountTier {
    match derive_u64(&["tier", email]) % 3 {
        0 => AccountTier::Free,
        1 => AccountTier::Premium,
        _ => AccountTier::Business,
    }
}

fn transaction_id(order_id: i64) -> String {
    Uuid::new_v5(
        &Uuid::NAMESPACE_OID,
        format!("wallet-transaction:{order_id}").as_bytes(),
    )
    .to_string()
}

/// Derives the provider's user and transaction tables from the base
/// orders. Wallet user ids are assigned in first-appearance order of the
/// email within the sample; when an email appears on several sampled
/// orders, profile fields come from the last one.
pub(crate) fn derive_synthetic(
    base_orders: &[BaseOrder],
    salt: &str,
    market_share_percent: u8,
) -> SyntheticData {
    let sample: Vec<&BaseOrder> = base_orders
        .iter()
        .filter(|o| sampled(o.order_id, market_share_percent))
        .collect();

    let mut emails_in_order: Vec<String> = Vec::new();
    let mut latest_order: HashMap<String, &BaseOrder> = HashMap::new();
    for order in &sample {
        if !latest_order.contains_key(&order.email) {
            emails_in_order.push(order.email.clone());
        }
        latest_order.insert(order.email.clone(), order);
    }

    let mut wallet_users = Vec::with_capacity(emails_in_order.len());
    let mut id_by_email: HashMap<&str, i64> = HashMap::new();
    for (index, email) in emails_in_order.iter().enumerate() {
        let wallet_user_id = index as i64 + 1;
        id_by_email.insert(email.as_str(), wallet_user_id);
        let Some(order) = latest_order.get(email.as_str()) else {
            continue;
        };
        wallet_users.push(WalletUser {
            wallet_user_id,
            email: email.clone(),
            hashed_email: join_key(email, salt),
            date_of_birth: date_of_birth(email),
            city: order.city.clone(),
            account_tier: account_tier(email),
            is_verified_user: derive_u64(&["verified", email]) % 2 == 0,
        });
    }

    let transactions = sample
        .iter()
        .filter_map(|order| {
            let wallet_user_id = *id_by_email.get(order.email.as_str())?;
            Some(WalletTransaction {
                transaction_id: transaction_id(order.order_id),
                order_id: order.order_id,
                wallet_user_id,
                transaction_amount: order.total_price,
                transaction_timestamp: order.created_at,
                status: order.status.clone(),
            })
        })
        .collect();

    SyntheticData {
        wallet_users,
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn base_order(order_id: i64, email: &str, city: &str, total: f64) -> BaseOrder {
        BaseOrder {
            order_id,
            email: email.to_string(),
            city: city.to_string(),
            status: "Complete".to_string(),
            total_price: total,
            created_at: DateTime::<Utc>::UNIX_EPOCH + TimeDelta::days(20_000),
        }
    }

    fn orders() -> Vec<BaseOrder> {
        (0..40)
            .map(|n| {
                base_order(
                    1_000 + n,
                    &format!("user{}@example.net", n % 11),
                    "Austin",
                    10.0 + n as f64,
                )
            })
            .collect()
    }

    #[test]
    fn test_full_share_keeps_every_order() {
        let data = derive_synthetic(&orders(), "salt", 100);
        assert_eq!(data.transactions.len(), 40);
        assert_eq!(data.wallet_users.len(), 11);
    }

    #[test]
    fn test_half_share_samples_a_strict_subset() {
        let all = derive_synthetic(&orders(), "salt", 100);
        let half = derive_synthetic(&orders(), "salt", 50);
        assert!(half.transactions.len() < all.transactions.len());
        assert!(!half.transactions.is_empty());
        let all_ids: Vec<i64> = all.transactions.iter().map(|t| t.order_id).collect();
        for tx in &half.transactions {
            assert!(all_ids.contains(&tx.order_id));
        }
    }

    #[test]
    fn test_salt_change_moves_only_the_join_keys() {
        let a = derive_synthetic(&orders(), "salt_one", 50);
        let b = derive_synthetic(&orders(), "salt_two", 50);
        assert_eq!(a.transactions, b.transactions);
        assert_eq!(a.wallet_users.len(), b.wallet_users.len());
        for (ua, ub) in a.wallet_users.iter().zip(&b.wallet_users) {
            assert_ne!(ua.hashed_email, ub.hashed_email);
            assert_eq!(ua.email, ub.email);
            assert_eq!(ua.wallet_user_id, ub.wallet_user_id);
            assert_eq!(ua.date_of_birth, ub.date_of_birth);
            assert_eq!(ua.account_tier, ub.account_tier);
            assert_eq!(ua.is_verified_user, ub.is_verified_user);
            assert_eq!(ua.city, ub.city);
        }
    }

    #[test]
    fn test_wallet_user_ids_are_dense_and_ordered() {
        let data = derive_synthetic(&orders(), "salt", 100);
        for (index, user) in data.wallet_users.iter().enumerate() {
            assert_eq!(user.wallet_user_id, index as i64 + 1);
        }
    }

    #[test]
    fn test_repeat_buyer_takes_profile_from_last_sampled_order() {
        let mut repeat = vec![
            base_order(1, "a@example.net", "Austin", 10.0),
            base_order(2, "a@example.net", "Denver", 12.0),
        ];
        repeat.push(base_order(3, "b@example.net", "Boston", 14.0));
        let data = derive_synthetic(&repeat, "salt", 100);
        assert_eq!(data.wallet_users.len(), 2);
        assert_eq!(data.wallet_users[0].email, "a@example.net");
        assert_eq!(data.wallet_users[0].city, "Denver");
        assert_eq!(data.transactions.len(), 3);
    }

    #[test]
    fn test_every_transaction_links_to_a_wallet_user() {
        let data = derive_synthetic(&orders(), "salt", 50);
        let ids: Vec<i64> = data.wallet_users.iter().map(|u| u.wallet_user_id).collect();
        for tx in &data.transactions {
            assert!(ids.contains(&tx.wallet_user_id));
        }
    }

    #[test]
    fn test_transaction_ids_are_stable_uuids() {
        let a = derive_synthetic(&orders(), "salt", 100);
        let b = derive_synthetic(&orders(), "salt", 100);
        assert_eq!(a.transactions, b.transactions);
        let parsed = Uuid::parse_str(&a.transactions[0].transaction_id).unwrap();
        assert_eq!(parsed.get_version(), Some(uuid::Version::Sha1));
    }

    #[test]
    fn test_amounts_and_timestamps_mirror_the_order() {
        let data = derive_synthetic(&orders(), "salt", 100);
        let source = orders();
        for tx in &data.transactions {
            let order = source.iter().find(|o| o.order_id == tx.order_id).unwrap();
            assert!((tx.transaction_amount - order.total_price).abs() < f64::EPSILON);
            assert_eq!(tx.transaction_timestamp, order.created_at);
            assert_eq!(tx.status, order.status);
        }
    }
}
