//! Deterministic demo customers

use chrono::{DateTime, Duration, Utc};

use super::types::{CUSTOMER_TIERS, NewCustomer};

const FIRST_NAMES: &[&str] = &[
    "John", "Maria", "Wei", "Amara", "Lucas", "Sofia", "Johanna", "Kenji", "Priya", "Omar",
];
const LAST_NAMES: &[&str] = &[
    "Smith", "Garcia", "Chen", "Okafor", "Silva", "Rossi", "Johnson", "Tanaka", "Patel", "Haddad",
];

/// First demo customer is created at 2024-01-01T00:00:00Z
const SEED_EPOCH_SECS: i64 = 1_704_067_200;

/// Build `count` customers. The same count always yields the same rows.
pub fn sample_customers(count: u32) -> Vec<NewCustomer> {
    let start = DateTime::<Utc>::from_timestamp(SEED_EPOCH_SECS, 0).unwrap_or_default();
    (0..count as usize)
        .map(|i| {
            let first = FIRST_NAMES[i % FIRST_NAMES.len()];
            let last = LAST_NAMES[(i / FIRST_NAMES.len() + i) % LAST_NAMES.len()];
            let created = start + Duration::hours(i as i64 * 37);
            NewCustomer {
                external_id: format!("CUST-{:05}", i + 1),
                account_id: (i / 4) as i64 + 1,
                name: format!("{} {}", first, last),
                email: (i % 5 != 0).then(|| {
                    format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase())
                }),
                active: i % 3 != 0,
                tier: CUSTOMER_TIERS[i % CUSTOMER_TIERS.len()].to_string(),
                balance: ((i * 7919) % 100_000) as f64 / 100.0,
                order_count: ((i * 13) % 50) as i64,
                created_at: created.timestamp(),
            }
        })
        .collect()
}
