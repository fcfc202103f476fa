//! # Booking Service
//!
//! Availability checks, the cart, checkout, and the rental lifecycle, built
//! on the repositories and the pure rules in wheels-core.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(user)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  gate.lock()          ← one reservation writer per process             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │  ├── load cart lines (+ car price)        none? → EmptyCart            │
//! │  ├── for each line:                                                     │
//! │  │     overlaps(car, range) in this tx    any?  → Conflict             │
//! │  │     quote(range, price)                                              │
//! │  │     INSERT rental (confirmed)                                        │
//! │  ├── DELETE cart entries                                                │
//! │  └── COMMIT                                                             │
//! │                                                                         │
//! │  Any error drops the transaction: no rentals, cart untouched.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gate is taken *before* the transaction begins. Taking it after would
//! let a task hold a pooled connection while waiting on the gate, which
//! deadlocks a single-connection pool.

mod availability;
mod cart;
mod checkout;
mod lifecycle;

pub use checkout::CheckoutReceipt;

use std::sync::Arc;

use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::error::DbError;
use crate::repository::car::CarRepository;
use wheels_core::{Car, CoreError, ValidationError};

// =============================================================================
// Errors
// =============================================================================

/// Errors from booking operations.
///
/// `Core` is a rule violation and will fail again until state changes.
/// `Storage` means the database failed; the transaction was rolled back and
/// the request may be retried.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Storage failure: {0}")]
    Storage(#[from] DbError),
}

impl BookingError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Storage(_))
    }
}

impl From<ValidationError> for BookingError {
    fn from(err: ValidationError) -> Self {
        BookingError::Core(CoreError::Validation(err))
    }
}

/// Result type for booking operations.
pub type BookingResult<T> = Result<T, BookingError>;

// =============================================================================
// Service
// =============================================================================

/// Entry point for every operation that reads or changes reservations.
///
/// Obtained from [`crate::Database::bookings`]; clones share the pool and
/// the reservation gate.
#[derive(Debug, Clone)]
pub struct BookingService {
    pool: SqlitePool,
    gate: Arc<Mutex<()>>,
}

impl BookingService {
    pub(crate) fn new(pool: SqlitePool, gate: Arc<Mutex<()>>) -> Self {
        BookingService { pool, gate }
    }

    /// Takes the reservation gate and opens a transaction, in that order.
    ///
    /// `BEGIN IMMEDIATE` takes SQLite's write lock at once. A deferred
    /// transaction would read a snapshot first and then fail with
    /// `SQLITE_BUSY_SNAPSHOT` at its first insert if any other connection
    /// wrote in between.
    async fn begin_exclusive(
        &self,
    ) -> BookingResult<(MutexGuard<'_, ()>, Transaction<'static, Sqlite>)> {
        let guard = self.gate.lock().await;
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;
        Ok((guard, tx))
    }

    async fn require_car(&self, car_id: i64) -> BookingResult<Car> {
        CarRepository::find(&self.pool, car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", car_id).into())
    }
}

async fn commit(tx: Transaction<'static, Sqlite>) -> BookingResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_storage_failures_are_retryable() {
        let storage = BookingError::from(DbError::PoolExhausted);
        assert!(storage.is_retryable());
        assert_eq!(storage.to_string(), "Storage failure: Connection pool exhausted");

        let core = BookingError::from(CoreError::EmptyCart);
        assert!(!core.is_retryable());
        assert_eq!(core.to_string(), "Cart is empty");
    }

    #[tokio::test]
    async fn test_reservation_transaction_holds_write_lock() {
        use crate::testing::seed_car;
        use crate::{Database, DbConfig};
        use std::time::Duration;

        let path = std::env::temp_dir().join(format!(
            "wheels-immediate-{}-{}.db",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let db = Database::new(
            DbConfig::new(&path)
                .max_connections(2)
                .busy_timeout(Duration::from_millis(100)),
        )
        .await
        .unwrap();

        let bookings = db.bookings();
        let (gate, tx) = bookings.begin_exclusive().await.unwrap();

        // No statement has run in the transaction yet, but writers are already shut out
        let err = db
            .cars()
            .insert(&wheels_core::CarInput {
                name: "Nissan Altima".to_string(),
                category: "sedan".to_string(),
                price_per_day: wheels_core::Money::from_dollars(58),
                image: None,
                description: None,
                seats: 5,
                is_available: true,
            })
            .await
            .unwrap_err();
        assert!(err.is_transient(), "{err:?}");

        tx.rollback().await.unwrap();
        drop(gate);
        seed_car(&db, "Nissan Altima", 5800).await;

        db.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[test]
    fn test_validation_lifts_into_core() {
        let err = BookingError::from(ValidationError::Required {
            field: "startDate".to_string(),
        });
        assert!(matches!(err, BookingError::Core(CoreError::Validation(_))));
    }
}
