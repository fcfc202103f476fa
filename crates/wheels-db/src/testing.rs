//! Fixtures shared by the in-crate tests.

use wheels_core::{CarInput, Money};

use crate::Database;

/// Inserts a regular user and returns its ID.
pub async fn seed_user(db: &Database, email: &str) -> i64 {
    db.users()
        .insert("Test User", email, "not-a-real-hash", false)
        .await
        .unwrap()
        .id
}

/// Inserts an available 5-seat car and returns its ID.
pub async fn seed_car(db: &Database, name: &str, price_cents: i64) -> i64 {
    db.cars()
        .insert(&CarInput {
            name: name.to_string(),
            category: "sedan".to_string(),
            price_per_day: Money::from_cents(price_cents),
            image: None,
            description: None,
            seats: 5,
            is_available: true,
        })
        .await
        .unwrap()
        .id
}
