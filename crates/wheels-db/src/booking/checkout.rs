//! Checkout: the user's whole cart becomes confirmed rentals, or nothing does.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{availability::availability_on, cart::conflict, commit, BookingResult, BookingService};
use crate::repository::cart::CartRepository;
use crate::repository::rental::{NewRental, RentalRepository};
use wheels_core::{pricing, CoreError, Money, RentalStatus, ValidationError};

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
    /// One rental per cart entry, in cart order.
    pub rental_ids: Vec<i64>,
    /// Sum of the rentals' total prices.
    pub total_price: Money,
}

impl BookingService {
    /// Converts every entry of the user's cart into a `confirmed` rental.
    ///
    /// Availability is re-checked for each entry inside the transaction, so
    /// a rental created after the entry was added is caught here, as is a
    /// second entry in the same cart overlapping the first.
    ///
    /// ## Errors
    /// - `EmptyCart` when the cart has no entries
    /// - `Conflict` naming the first entry that can no longer be booked
    /// - `Storage` when the database fails
    ///
    /// On any error nothing is written and the cart is left as it was.
    pub async fn checkout(&self, user_id: i64) -> BookingResult<CheckoutReceipt> {
        let (_gate, mut tx) = self.begin_exclusive().await?;

        let lines = CartRepository::lines_for_user(&mut *tx, user_id).await?;
        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let mut rental_ids = Vec::with_capacity(lines.len());
        let mut total_price = Money::zero();

        for line in &lines {
            let range = line.range()?;

            let availability = availability_on(&mut *tx, line.car_id, &range).await?;
            if !availability.available {
                warn!(
                    user_id,
                    car_id = line.car_id,
                    entry_id = line.id,
                    range = %range,
                    "Checkout conflict, rolling back"
                );
                return Err(conflict(line.car_id, &range).into());
            }

            let quote = pricing::quote(&range, line.price_per_day)?;
            let rental_id = RentalRepository::insert(
                &mut *tx,
                &NewRental {
                    user_id,
                    car_id: line.car_id,
                    range,
                    total_price: quote.total,
                    status: RentalStatus::Confirmed,
                },
            )
            .await?;

            rental_ids.push(rental_id);
            total_price = total_price.checked_add(quote.total).ok_or_else(|| {
                ValidationError::OutOfRange {
                    field: "totalPrice".to_string(),
                    min: 0,
                    max: i64::MAX,
                }
            })?;
        }

        CartRepository::clear_for_user(&mut *tx, user_id).await?;
        commit(tx).await?;

        info!(
            user_id,
            rentals = rental_ids.len(),
            total = %total_price,
            "Checkout complete"
        );

        Ok(CheckoutReceipt {
            rental_ids,
            total_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::booking::BookingError;
    use crate::repository::rental::{NewRental, RentalRepository};
    use crate::testing::{seed_car, seed_user};
    use crate::{Database, DbConfig};
    use wheels_core::{CoreError, DateRange, Money, RentalStatus, ValidationError};

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;

        let err = db.bookings().checkout(user).await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::EmptyCart)));
        assert_eq!(db.rentals().count(None).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_two_days_at_fifty_dollars() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota Camry", 5000).await;

        db.bookings()
            .add_to_cart(user, car, &range("2024-01-01", "2024-01-03"))
            .await
            .unwrap();
        let receipt = db.bookings().checkout(user).await.unwrap();

        assert_eq!(receipt.rental_ids.len(), 1);
        assert_eq!(receipt.total_price, Money::from_dollars(100));

        let rental = db.rentals().get_by_id(receipt.rental_ids[0]).await.unwrap().unwrap();
        assert_eq!(rental.total_price, Money::from_dollars(100));
        assert_eq!(rental.status, RentalStatus::Confirmed);
        assert_eq!(rental.user_id, user);
        assert!(db.bookings().list_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_multiple_entries_all_confirmed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let rav4 = seed_car(&db, "Toyota RAV4", 7500).await;
        let pilot = seed_car(&db, "Honda Pilot", 8500).await;

        let bookings = db.bookings();
        bookings.add_to_cart(user, rav4, &range("2024-02-01", "2024-02-04")).await.unwrap();
        bookings.add_to_cart(user, pilot, &range("2024-02-01", "2024-02-02")).await.unwrap();
        bookings.add_to_cart(user, rav4, &range("2024-03-01", "2024-03-02")).await.unwrap();

        let receipt = bookings.checkout(user).await.unwrap();
        assert_eq!(receipt.rental_ids.len(), 3);
        // 3 × 75 + 1 × 85 + 1 × 75
        assert_eq!(receipt.total_price, Money::from_dollars(385));

        let mine = bookings.list_my_rentals(user).await.unwrap();
        assert_eq!(mine.len(), 3);
        assert!(mine.iter().all(|r| r.status == RentalStatus::Confirmed));
        assert!(bookings.list_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_total_overflow_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        // Each 2-day quote fits in i64, their sum does not
        let car = seed_car(&db, "Gold Limousine", 2_500_000_000_000_000_000).await;

        let bookings = db.bookings();
        bookings.add_to_cart(user, car, &range("2024-01-01", "2024-01-03")).await.unwrap();
        bookings.add_to_cart(user, car, &range("2024-02-01", "2024-02-03")).await.unwrap();

        let err = bookings.checkout(user).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Core(CoreError::Validation(ValidationError::OutOfRange { ref field, .. }))
                if field == "totalPrice"
        ));
        assert!(!err.is_retryable());
        assert_eq!(db.rentals().count(None).await.unwrap(), 0);
        assert_eq!(bookings.list_cart(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_conflict_mid_cart_rolls_back_everything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ann = seed_user(&db, "ann@example.com").await;
        let bob = seed_user(&db, "bob@example.com").await;
        let first = seed_car(&db, "Toyota RAV4", 7500).await;
        let second = seed_car(&db, "Honda Pilot", 8500).await;

        let bookings = db.bookings();
        bookings.add_to_cart(ann, first, &range("2024-01-01", "2024-01-03")).await.unwrap();
        bookings.add_to_cart(ann, second, &range("2024-01-01", "2024-01-03")).await.unwrap();

        // Someone books the second car after it went into the cart
        RentalRepository::insert(
            db.pool(),
            &NewRental {
                user_id: bob,
                car_id: second,
                range: range("2024-01-02", "2024-01-04"),
                total_price: Money::from_dollars(170),
                status: RentalStatus::Confirmed,
            },
        )
        .await
        .unwrap();

        let err = bookings.checkout(ann).await.unwrap_err();
        assert!(matches!(
            err,
            BookingError::Core(CoreError::Conflict { car_id, .. }) if car_id == second
        ));

        assert_eq!(db.rentals().count(Some(ann)).await.unwrap(), 0);
        assert_eq!(bookings.list_cart(ann).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_entries_in_same_cart_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;

        let bookings = db.bookings();
        bookings.add_to_cart(user, car, &range("2024-01-01", "2024-01-05")).await.unwrap();
        bookings.add_to_cart(user, car, &range("2024-01-04", "2024-01-08")).await.unwrap();

        let err = bookings.checkout(user).await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::Conflict { .. })));
        assert_eq!(db.rentals().count(None).await.unwrap(), 0);
        assert_eq!(bookings.list_cart(user).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_rolls_back() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let ok_car = seed_car(&db, "Toyota RAV4", 7500).await;
        let bad_car = seed_car(&db, "Honda Pilot", 8500).await;

        let bookings = db.bookings();
        bookings.add_to_cart(user, ok_car, &range("2024-01-01", "2024-01-03")).await.unwrap();
        bookings.add_to_cart(user, bad_car, &range("2024-01-01", "2024-01-03")).await.unwrap();

        sqlx::query(&format!(
            "CREATE TRIGGER reject_rental BEFORE INSERT ON rentals \
             WHEN NEW.car_id = {bad_car} BEGIN SELECT RAISE(ABORT, 'disk on fire'); END"
        ))
        .execute(db.pool())
        .await
        .unwrap();

        let err = bookings.checkout(user).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(err, BookingError::Storage(_)));

        assert_eq!(db.rentals().count(None).await.unwrap(), 0);
        assert_eq!(bookings.list_cart(user).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_exactly_one_wins() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ann = seed_user(&db, "ann@example.com").await;
        let bob = seed_user(&db, "bob@example.com").await;
        let car = seed_car(&db, "Ford Transit", 9500).await;

        db.bookings().add_to_cart(ann, car, &range("2024-05-01", "2024-05-04")).await.unwrap();
        db.bookings().add_to_cart(bob, car, &range("2024-05-03", "2024-05-06")).await.unwrap();

        let a = tokio::spawn({
            let bookings = db.bookings();
            async move { bookings.checkout(ann).await }
        });
        let b = tokio::spawn({
            let bookings = db.bookings();
            async move { bookings.checkout(bob).await }
        });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert!(matches!(loser, BookingError::Core(CoreError::Conflict { .. })));

        let availability = db
            .bookings()
            .check_availability(car, &range("2024-05-01", "2024-05-06"))
            .await
            .unwrap();
        assert_eq!(availability.conflicts.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_on_file_database() {
        let path = std::env::temp_dir().join(format!(
            "wheels-checkout-{}-{}.db",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let db = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();

        let car = seed_car(&db, "Chevrolet Express", 9000).await;
        let mut users = Vec::new();
        for i in 0..6 {
            let user = seed_user(&db, &format!("user{i}@example.com")).await;
            db.bookings()
                .add_to_cart(user, car, &range("2024-07-10", "2024-07-12"))
                .await
                .unwrap();
            users.push(user);
        }

        let handles: Vec<_> = users
            .into_iter()
            .map(|user| {
                let bookings = db.bookings();
                tokio::spawn(async move { bookings.checkout(user).await })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(err) => assert!(matches!(err, BookingError::Core(CoreError::Conflict { .. }))),
            }
        }
        assert_eq!(winners, 1);
        assert_eq!(db.rentals().count(None).await.unwrap(), 1);

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
