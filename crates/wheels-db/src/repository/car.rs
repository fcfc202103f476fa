//! # Car Repository
//!
//! Database operations for the rental catalog.
//!
//! ## Listing
//! ```text
//! GET /api/cars?category=suv&available=true
//!       │
//!       ▼
//! CarFilter { category: Some("suv"), available_only: true }
//!       │
//!       ▼
//! SELECT ... FROM cars WHERE category = ?1 AND is_available = 1 ORDER BY id
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use wheels_core::{Car, CarInput};

const CAR_COLUMNS: &str =
    "id, name, category, price_per_day, image, description, seats, is_available, created_at";

/// Catalog listing filter.
#[derive(Debug, Clone, Default)]
pub struct CarFilter {
    /// Exact (lowercase) category match.
    pub category: Option<String>,
    /// Only cars whose listing flag is set.
    pub available_only: bool,
}

/// Repository for car database operations.
#[derive(Debug, Clone)]
pub struct CarRepository {
    pool: SqlitePool,
}

impl CarRepository {
    /// Creates a new CarRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CarRepository { pool }
    }

    /// Lists cars matching `filter`, oldest first.
    pub async fn list(&self, filter: &CarFilter) -> DbResult<Vec<Car>> {
        debug!(category = ?filter.category, available_only = filter.available_only, "Listing cars");

        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {CAR_COLUMNS} FROM cars WHERE 1 = 1"));

        if let Some(category) = filter.category.as_deref().map(str::trim) {
            if !category.is_empty() {
                query.push(" AND category = ").push_bind(category.to_lowercase());
            }
        }
        if filter.available_only {
            query.push(" AND is_available = 1");
        }
        query.push(" ORDER BY id");

        let cars = query.build_query_as::<Car>().fetch_all(&self.pool).await?;
        Ok(cars)
    }

    /// Gets a car by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Car>> {
        Self::find(&self.pool, id).await
    }

    /// Gets a car by ID on any executor (pool or open transaction).
    pub async fn find<'e, E>(executor: E, id: i64) -> DbResult<Option<Car>>
    where
        E: SqliteExecutor<'e>,
    {
        let car = sqlx::query_as::<_, Car>(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(car)
    }

    /// Inserts a car. The input is expected to be validated already.
    pub async fn insert(&self, input: &CarInput) -> DbResult<Car> {
        debug!(name = %input.name, category = %input.category, "Inserting car");

        let result = sqlx::query(
            r#"
            INSERT INTO cars (
                name, category, price_per_day, image, description, seats, is_available, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price_per_day)
        .bind(&input.image)
        .bind(&input.description)
        .bind(input.seats)
        .bind(input.is_available)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::Internal(format!("car {id} vanished after insert")))
    }

    /// Replaces a car's catalog data.
    ///
    /// Existing rentals keep the price they were created with.
    pub async fn update(&self, id: i64, input: &CarInput) -> DbResult<Car> {
        debug!(id, name = %input.name, "Updating car");

        let result = sqlx::query(
            r#"
            UPDATE cars SET
                name = ?2,
                category = ?3,
                price_per_day = ?4,
                image = ?5,
                description = ?6,
                seats = ?7,
                is_available = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.price_per_day)
        .bind(&input.image)
        .bind(&input.description)
        .bind(input.seats)
        .bind(input.is_available)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Car", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Car", id))
    }

    /// Deletes a car.
    ///
    /// Cart entries for the car go with it; rentals and feedback do not, so a
    /// car with history fails with `ForeignKeyViolation`.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting car");

        let result = sqlx::query("DELETE FROM cars WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Car", id));
        }

        Ok(())
    }

    /// Counts all cars.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use wheels_core::Money;

    fn input(name: &str, category: &str, dollars: i64) -> CarInput {
        CarInput {
            name: name.to_string(),
            category: category.to_string(),
            price_per_day: Money::from_dollars(dollars),
            image: Some(format!("/assets/{}.jpg", name.to_lowercase().replace(' ', "-"))),
            description: None,
            seats: 5,
            is_available: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let car = db.cars().insert(&input("Toyota Camry", "sedan", 55)).await.unwrap();

        let found = db.cars().get_by_id(car.id).await.unwrap().unwrap();
        assert_eq!(found, car);
        assert_eq!(found.price_per_day.cents(), 5500);
        assert_eq!(found.image.as_deref(), Some("/assets/toyota-camry.jpg"));
        assert!(db.cars().get_by_id(car.id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cars = db.cars();
        cars.insert(&input("Toyota RAV4", "suv", 75)).await.unwrap();
        cars.insert(&input("Honda Accord", "sedan", 60)).await.unwrap();
        let mut hidden = input("Mazda CX-5", "suv", 70);
        hidden.is_available = false;
        cars.insert(&hidden).await.unwrap();

        assert_eq!(cars.list(&CarFilter::default()).await.unwrap().len(), 3);

        let suvs = cars
            .list(&CarFilter {
                category: Some("SUV".to_string()),
                available_only: false,
            })
            .await
            .unwrap();
        assert_eq!(suvs.len(), 2);

        let available_suvs = cars
            .list(&CarFilter {
                category: Some("suv".to_string()),
                available_only: true,
            })
            .await
            .unwrap();
        assert_eq!(available_suvs.len(), 1);
        assert_eq!(available_suvs[0].name, "Toyota RAV4");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cars = db.cars();

        let car = cars.insert(&input("Ford Transit", "van", 95)).await.unwrap();
        let mut changed = input("Ford Transit", "van", 99);
        changed.seats = 12;
        let updated = cars.update(car.id, &changed).await.unwrap();
        assert_eq!(updated.price_per_day, Money::from_dollars(99));
        assert_eq!(updated.seats, 12);

        assert!(matches!(
            cars.update(999, &changed).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(cars.delete(999).await, Err(DbError::NotFound { .. })));

        cars.delete(car.id).await.unwrap();
        assert_eq!(cars.count().await.unwrap(), 0);
    }
}
