//! Cart operations.

use tracing::{debug, info, warn};

use super::{availability::availability_on, BookingError, BookingResult, BookingService};
use crate::error::DbError;
use crate::repository::cart::CartRepository;
use wheels_core::{CartLine, CoreError, DateRange, MAX_CART_ENTRIES};

impl BookingService {
    fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    /// Adds a tentative reservation to the user's cart and returns its ID.
    ///
    /// ## Errors
    /// - `NotFound` if the car does not exist
    /// - `CartTooLarge` if the cart already holds [`MAX_CART_ENTRIES`]
    /// - `Conflict` if a blocking rental overlaps the range
    /// - `DuplicateEntry` if the same (car, start, end) is already in the cart
    pub async fn add_to_cart(
        &self,
        user_id: i64,
        car_id: i64,
        range: &DateRange,
    ) -> BookingResult<i64> {
        self.require_car(car_id).await?;

        let carts = self.carts();

        let count = carts.count_for_user(user_id).await?;
        if count >= MAX_CART_ENTRIES as i64 {
            warn!(user_id, count, "Cart is full");
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ENTRIES,
            }
            .into());
        }

        let availability = availability_on(&self.pool, car_id, range).await?;
        if !availability.available {
            warn!(
                user_id,
                car_id,
                range = %range,
                conflicts = availability.conflicts.len(),
                "Car not available for cart entry"
            );
            return Err(conflict(car_id, range).into());
        }

        if carts.contains(user_id, car_id, range).await? {
            return Err(duplicate(car_id, range).into());
        }

        let id = carts
            .insert(user_id, car_id, range)
            .await
            .map_err(|err| match err {
                // Lost a race with an identical request
                DbError::UniqueViolation { .. } => BookingError::from(duplicate(car_id, range)),
                // Car deleted between the lookup and the insert
                DbError::ForeignKeyViolation { .. } => {
                    BookingError::from(CoreError::not_found("Car", car_id))
                }
                other => BookingError::from(other),
            })?;

        info!(user_id, car_id, entry_id = id, range = %range, "Added to cart");
        Ok(id)
    }

    /// Removes one of the user's own cart entries.
    ///
    /// ## Errors
    /// `NotFound` if the entry does not exist or belongs to someone else.
    pub async fn remove_from_cart(&self, entry_id: i64, user_id: i64) -> BookingResult<()> {
        match self.carts().delete_owned(entry_id, user_id).await {
            Ok(()) => {
                debug!(user_id, entry_id, "Removed from cart");
                Ok(())
            }
            Err(DbError::NotFound { .. }) => {
                Err(CoreError::not_found("Cart entry", entry_id).into())
            }
            Err(other) => Err(other.into()),
        }
    }

    /// The user's cart with current car data. No availability re-check.
    pub async fn list_cart(&self, user_id: i64) -> BookingResult<Vec<CartLine>> {
        Ok(self.carts().list_lines(user_id).await?)
    }
}

pub(super) fn conflict(car_id: i64, range: &DateRange) -> CoreError {
    CoreError::Conflict {
        car_id,
        start: range.start(),
        end: range.end(),
    }
}

fn duplicate(car_id: i64, range: &DateRange) -> CoreError {
    CoreError::DuplicateEntry {
        car_id,
        start: range.start(),
        end: range.end(),
    }
}

#[cfg(test)]
mod tests {
    use crate::booking::BookingError;
    use crate::repository::rental::{NewRental, RentalRepository};
    use crate::testing::{seed_car, seed_user};
    use crate::{Database, DbConfig};
    use wheels_core::{CoreError, DateRange, Money, RentalStatus, MAX_CART_ENTRIES};

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;
        let bookings = db.bookings();

        let id = bookings
            .add_to_cart(user, car, &range("2024-01-01", "2024-01-03"))
            .await
            .unwrap();

        let lines = bookings.list_cart(user).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, id);
        assert_eq!(lines[0].car_name, "Toyota RAV4");
        assert_eq!(lines[0].price_per_day, Money::from_cents(7500));

        bookings.remove_from_cart(id, user).await.unwrap();
        assert!(bookings.list_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_entry_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;
        let r = range("2024-01-01", "2024-01-03");

        db.bookings().add_to_cart(user, car, &r).await.unwrap();
        let err = db.bookings().add_to_cart(user, car, &r).await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::DuplicateEntry { .. })));

        // Same car and dates for another user is fine
        let other = seed_user(&db, "bob@example.com").await;
        db.bookings().add_to_cart(other, car, &r).await.unwrap();
    }

    #[tokio::test]
    async fn test_conflicting_entry_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;

        RentalRepository::insert(
            db.pool(),
            &NewRental {
                user_id: user,
                car_id: car,
                range: range("2024-01-02", "2024-01-05"),
                total_price: Money::from_cents(22500),
                status: RentalStatus::Pending,
            },
        )
        .await
        .unwrap();

        let err = db
            .bookings()
            .add_to_cart(user, car, &range("2024-01-01", "2024-01-03"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::Conflict { car_id, .. }) if car_id == car));
        assert!(db.bookings().list_cart(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_car_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;

        let err = db
            .bookings()
            .add_to_cart(user, 404, &range("2024-01-01", "2024-01-03"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_cart_size_capped() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;
        let bookings = db.bookings();

        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..MAX_CART_ENTRIES as i64 {
            let s = start + chrono::Duration::days(i * 10);
            let r = DateRange::new(s, s + chrono::Duration::days(2)).unwrap();
            bookings.add_to_cart(user, car, &r).await.unwrap();
        }

        let err = bookings
            .add_to_cart(user, car, &range("2025-06-01", "2025-06-02"))
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::CartTooLarge { .. })));
    }

    #[tokio::test]
    async fn test_cannot_remove_someone_elses_entry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let ann = seed_user(&db, "ann@example.com").await;
        let bob = seed_user(&db, "bob@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;

        let id = db
            .bookings()
            .add_to_cart(ann, car, &range("2024-01-01", "2024-01-03"))
            .await
            .unwrap();

        let err = db.bookings().remove_from_cart(id, bob).await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::NotFound { .. })));
        let err = db.bookings().remove_from_cart(id + 1, ann).await.unwrap_err();
        assert!(matches!(err, BookingError::Core(CoreError::NotFound { .. })));

        assert_eq!(db.bookings().list_cart(ann).await.unwrap().len(), 1);
    }
}
