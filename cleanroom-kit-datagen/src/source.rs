//! Deterministic retail source corpus.
//!
//! The simulation has no public dataset to snapshot from, so `seed`
//! fabricates one: a small e-commerce source with users, orders across a
//! window of days, and line items. Every value is drawn from the digest
//! stream, so the same configuration always produces the same corpus.
//!
//! Every tenth user id appears twice with a later `created_at` and a
//! different city, giving the snapshot's de-duplication real work to do.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::hashing::derive_u64;
use crate::tables::{Order, OrderItem, SourceUser};

const FIRST_NAMES: &[&str] = &[
    "Alice", "Ben", "Carol", "Dan", "Erin", "Frank", "Grace", "Hugo", "Iris", "Juan", "Kira",
    "Liam", "Mona", "Nate", "Olga", "Pete", "Quinn", "Rosa", "Sam", "Tara",
];

const LAST_NAMES: &[&str] = &[
    "Almeida", "Baker", "Chen", "Diaz", "Evans", "Fischer", "Garcia", "Haile", "Ito", "Jensen",
    "Kaur", "Lopez", "Meyer", "Novak", "Okafor", "Park", "Quispe", "Rossi", "Sato", "Tran",
];

const CITIES: &[&str] = &[
    "Portland", "Austin", "Chicago", "Denver", "Seattle", "Atlanta", "Boston", "Phoenix",
    "Madrid", "Toronto", "Leeds", "Osaka",
];

const COUNTRIES: &[&str] = &["US", "US", "US", "US", "ES", "CA", "GB", "JP"];

// Cumulative percentage thresholds over the order status vocabulary.
const STATUS_BANDS: &[(u64, &str)] = &[
    (40, "Complete"),
    (65, "Shipped"),
    (80, "Processing"),
    (90, "Cancelled"),
    (100, "Returned"),
];

pub(crate) struct SourceCorpus {
    pub users: Vec<SourceUser>,
    pub orders: Vec<Order>,
    pub order_items: Vec<OrderItem>,
}

fn pick<'a>(choices: &'a [&'a str], seed: u64) -> &'a str {
    choices[(seed % choices.len() as u64) as usize]
}

fn order_status(seed: u64) -> &'static str {
    let band = seed % 100;
    for (limit, status) in STATUS_BANDS {
        if band < *limit {
            return status;
        }
    }
    "Complete"
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Builds the whole source corpus around `anchor`: orders land on the five
/// days centered on it, users register during the two years before it.
pub(crate) fn build_corpus(user_count: u32, order_count: u32, anchor: NaiveDate) -> SourceCorpus {
    let anchor_midnight = midnight(anchor);
    let mut users = Vec::new();

    for id in 1..=i64::from(user_count) {
        let tag = id.to_string();
        let first = pick(FIRST_NAMES, derive_u64(&["user", &tag, "first"]));
        let last = pick(LAST_NAMES, derive_u64(&["user", &tag, "last"]));
        let email = format!(
            "{}.{}.{id}@example.net",
            first.to_lowercase(),
            last.to_lowercase()
        );
        let city_idx = (derive_u64(&["user", &tag, "city"]) % CITIES.len() as u64) as usize;
        let registered = anchor_midnight
            - TimeDelta::days(30 + (derive_u64(&["user", &tag, "age"]) % 700) as i64)
            + TimeDelta::seconds((derive_u64(&["user", &tag, "tod"]) % 86_400) as i64);
        users.push(SourceUser {
            id,
            email: email.clone(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            city: CITIES[city_idx].to_string(),
            country: pick(COUNTRIES, derive_u64(&["user", &tag, "country"])).to_string(),
            created_at: registered,
        });

        if id % 10 == 0 {
            // Re-registration: same identity, newer record, always a moved city.
            let hop = 1 + (derive_u64(&["user", &tag, "city2"]) % (CITIES.len() as u64 - 1)) as usize;
            users.push(SourceUser {
                id,
                email,
                first_name: first.to_string(),
                last_name: last.to_string(),
                city: CITIES[(city_idx + hop) % CITIES.len()].to_string(),
                country: pick(COUNTRIES, derive_u64(&["user", &tag, "country"])).to_string(),
                created_at: registered
                    + TimeDelta::hours(1 + (derive_u64(&["user", &tag, "later"]) % 600) as i64),
            });
        }
    }

    let mut orders = Vec::new();
    let mut order_items = Vec::new();
    let mut item_id = 1;

    for n in 1..=i64::from(order_count) {
        let order_id = 1_000 + n;
        let tag = order_id.to_string();
        let user_id = (derive_u64(&["order", &tag, "user"]) % u64::from(user_count)) as i64 + 1;
        let status = order_status(derive_u64(&["order", &tag, "status"]));
        let day_offset = (derive_u64(&["order", &tag, "day"]) % 5) as i64 - 2;
        let placed_at = anchor_midnight
            + TimeDelta::days(day_offset)
            + TimeDelta::seconds((derive_u64(&["order", &tag, "tod"]) % 86_400) as i64);
        let item_count = 1 + (derive_u64(&["order", &tag, "items"]) % 3) as i64;

        orders.push(Order {
            order_id,
            user_id,
            status: status.to_string(),
            created_at: placed_at,
            num_of_item: item_count,
        });

        for j in 0..item_count {
            let item_tag = format!("{order_id}:{j}");
            order_items.push(OrderItem {
                id: item_id,
                order_id,
                user_id,
                product_id: (derive_u64(&["item", &item_tag, "product"]) % 500) as i64 + 1,
                sale_price: (derive_u64(&["item", &item_tag, "price"]) % 9_500 + 500) as f64
                    / 100.0,
                status: status.to_string(),
            });
            item_id += 1;
        }
    }

    SourceCorpus {
        users,
        orders,
        order_items,
    }
}
