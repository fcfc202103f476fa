//! # Rental Repository
//!
//! Database operations for rentals.
//!
//! ## Rental Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rental Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE                                                             │
//! │     ├── checkout()  → Rental { status: Confirmed }  (one per entry)    │
//! │     └── reserve()   → Rental { status: Pending }                       │
//! │                                                                         │
//! │  2. ADVANCE (admin)                                                    │
//! │     └── set_status(): pending → confirmed → active → completed         │
//! │                                                                         │
//! │  3. (OPTIONAL) CANCEL                                                  │
//! │     └── set_status(): pending | confirmed → cancelled                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status writes are compare-and-set on the previous status, so two
//! concurrent updates cannot both apply.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use wheels_core::{DateRange, Money, Rental, RentalDetails, RentalOverview, RentalStatus};

const RENTAL_COLUMNS: &str =
    "id, user_id, car_id, start_date, end_date, total_price, status, created_at";

/// Values for a rental about to be inserted.
#[derive(Debug, Clone, Copy)]
pub struct NewRental {
    pub user_id: i64,
    pub car_id: i64,
    pub range: DateRange,
    pub total_price: Money,
    pub status: RentalStatus,
}

/// Repository for rental database operations.
#[derive(Debug, Clone)]
pub struct RentalRepository {
    pool: SqlitePool,
}

impl RentalRepository {
    /// Creates a new RentalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RentalRepository { pool }
    }

    /// Gets a rental by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Rental>> {
        Self::find(&self.pool, id).await
    }

    pub async fn find<'e, E>(executor: E, id: i64) -> DbResult<Option<Rental>>
    where
        E: SqliteExecutor<'e>,
    {
        let rental = sqlx::query_as::<_, Rental>(&format!(
            "SELECT {RENTAL_COLUMNS} FROM rentals WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(rental)
    }

    /// Rentals of `car_id` in a blocking status whose range overlaps `range`.
    ///
    /// Inclusive overlap on ISO date text: `start <= req_end AND end >= req_start`.
    pub async fn blocking_overlaps<'e, E>(
        executor: E,
        car_id: i64,
        range: &DateRange,
    ) -> DbResult<Vec<Rental>>
    where
        E: SqliteExecutor<'e>,
    {
        let rentals = sqlx::query_as::<_, Rental>(&format!(
            r#"
            SELECT {RENTAL_COLUMNS} FROM rentals
            WHERE car_id = ?1
              AND status IN ('pending', 'confirmed', 'active')
              AND start_date <= ?3
              AND end_date >= ?2
            ORDER BY start_date, id
            "#
        ))
        .bind(car_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_all(executor)
        .await?;
        Ok(rentals)
    }

    /// Inserts a rental and returns its ID.
    pub async fn insert<'e, E>(executor: E, rental: &NewRental) -> DbResult<i64>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(
            user_id = rental.user_id,
            car_id = rental.car_id,
            range = %rental.range,
            total = %rental.total_price,
            status = %rental.status,
            "Inserting rental"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO rentals (
                user_id, car_id, start_date, end_date, total_price, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(rental.user_id)
        .bind(rental.car_id)
        .bind(rental.range.start())
        .bind(rental.range.end())
        .bind(rental.total_price)
        .bind(rental.status)
        .bind(Utc::now())
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Moves a rental from `from` to `to`.
    ///
    /// ## Errors
    /// `NotFound` when no rental with that ID is currently in `from`.
    pub async fn set_status<'e, E>(
        executor: E,
        id: i64,
        from: RentalStatus,
        to: RentalStatus,
    ) -> DbResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        debug!(id, from = %from, to = %to, "Updating rental status");

        let result = sqlx::query("UPDATE rentals SET status = ?3 WHERE id = ?1 AND status = ?2")
            .bind(id)
            .bind(from)
            .bind(to)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(format!("Rental ({from})"), id));
        }

        Ok(())
    }

    /// A user's rentals with car data, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<RentalDetails>> {
        let rentals = sqlx::query_as::<_, RentalDetails>(
            r#"
            SELECT
                r.id, r.car_id, r.start_date, r.end_date, r.total_price, r.status, r.created_at,
                c.name AS car_name, c.image, c.category
            FROM rentals r
            JOIN cars c ON c.id = r.car_id
            WHERE r.user_id = ?1
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rentals)
    }

    /// Every rental with car and renter data, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<RentalOverview>> {
        let rentals = sqlx::query_as::<_, RentalOverview>(
            r#"
            SELECT
                r.id, r.user_id, r.car_id, r.start_date, r.end_date, r.total_price,
                r.status, r.created_at,
                c.name AS car_name, u.name AS user_name, u.email AS user_email
            FROM rentals r
            JOIN cars c ON c.id = r.car_id
            JOIN users u ON u.id = r.user_id
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rentals)
    }

    /// Counts rentals, optionally restricted to one user.
    pub async fn count(&self, user_id: Option<i64>) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rentals WHERE ?1 IS NULL OR user_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
