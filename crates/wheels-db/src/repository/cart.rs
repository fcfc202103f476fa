//! # Cart Repository
//!
//! Storage for cart entries. The booking rules (availability, duplicates,
//! size cap) live in [`crate::booking`]; this module is plain SQL.
//!
//! Functions that take an executor run either on the pool or inside an open
//! transaction (`&mut *tx`), which is how checkout reads and clears the cart
//! atomically.

use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use wheels_core::{CartEntry, CartLine, DateRange};

/// Repository for cart database operations.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Lists a user's cart joined with current car data, in insertion order.
    pub async fn list_lines(&self, user_id: i64) -> DbResult<Vec<CartLine>> {
        Self::lines_for_user(&self.pool, user_id).await
    }

    pub async fn lines_for_user<'e, E>(executor: E, user_id: i64) -> DbResult<Vec<CartLine>>
    where
        E: SqliteExecutor<'e>,
    {
        let lines = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT
                ce.id,
                ce.car_id,
                ce.start_date,
                ce.end_date,
                c.name AS car_name,
                c.category,
                c.price_per_day,
                c.image,
                ce.created_at
            FROM cart_entries ce
            JOIN cars c ON c.id = ce.car_id
            WHERE ce.user_id = ?1
            ORDER BY ce.id
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    /// Gets a raw entry by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<CartEntry>> {
        let entry = sqlx::query_as::<_, CartEntry>(
            "SELECT id, user_id, car_id, start_date, end_date, created_at FROM cart_entries WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(entry)
    }

    /// Counts a user's entries.
    pub async fn count_for_user(&self, user_id: i64) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cart_entries WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Whether the exact (user, car, start, end) tuple is already in the cart.
    pub async fn contains(&self, user_id: i64, car_id: i64, range: &DateRange) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM cart_entries
            WHERE user_id = ?1 AND car_id = ?2 AND start_date = ?3 AND end_date = ?4
            "#,
        )
        .bind(user_id)
        .bind(car_id)
        .bind(range.start())
        .bind(range.end())
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    /// Inserts an entry and returns its ID.
    ///
    /// ## Errors
    /// - `UniqueViolation` when the tuple already exists
    /// - `ForeignKeyViolation` when the user or car does not exist
    pub async fn insert(&self, user_id: i64, car_id: i64, range: &DateRange) -> DbResult<i64> {
        debug!(user_id, car_id, range = %range, "Inserting cart entry");

        let result = sqlx::query(
            r#"
            INSERT INTO cart_entries (user_id, car_id, start_date, end_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(user_id)
        .bind(car_id)
        .bind(range.start())
        .bind(range.end())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Deletes an entry only if it belongs to `user_id`.
    ///
    /// A missing entry and someone else's entry look the same: `NotFound`.
    pub async fn delete_owned(&self, entry_id: i64, user_id: i64) -> DbResult<()> {
        debug!(entry_id, user_id, "Deleting cart entry");

        let result = sqlx::query("DELETE FROM cart_entries WHERE id = ?1 AND user_id = ?2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart entry", entry_id));
        }

        Ok(())
    }

    /// Removes every entry of a user. Returns the number removed.
    pub async fn clear_for_user<'e, E>(executor: E, user_id: i64) -> DbResult<u64>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM cart_entries WHERE user_id = ?1")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
