//! # Feedback Repository
//!
//! Ratings and comments on cars, one per (user, car). Submitting again
//! replaces the earlier rating and comment.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use wheels_core::{CarReview, Feedback, FeedbackOverview, MyFeedback, RatingSummary};

const FEEDBACK_COLUMNS: &str = "id, user_id, car_id, rating, comment, created_at";

const OVERVIEW_SELECT: &str = r#"
    SELECT
        f.id, f.user_id, f.car_id, f.rating, f.comment, f.created_at,
        u.name AS user_name, u.email AS user_email,
        c.name AS car_name, c.category AS car_category,
        c.price_per_day AS car_price, c.description AS car_description
    FROM feedback f
    JOIN users u ON u.id = f.user_id
    JOIN cars c ON c.id = f.car_id
"#;

/// Whether a submission created a new row or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Created,
    Updated,
}

/// Repository for feedback database operations.
#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: SqlitePool,
}

impl FeedbackRepository {
    /// Creates a new FeedbackRepository.
    pub fn new(pool: SqlitePool) -> Self {
        FeedbackRepository { pool }
    }

    /// Creates or replaces the caller's feedback for a car.
    ///
    /// ## Errors
    /// `ForeignKeyViolation` when the car does not exist.
    pub async fn upsert(
        &self,
        user_id: i64,
        car_id: i64,
        rating: i64,
        comment: Option<&str>,
    ) -> DbResult<(Feedback, Submission)> {
        debug!(user_id, car_id, rating, "Submitting feedback");

        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM feedback WHERE user_id = ?1 AND car_id = ?2")
                .bind(user_id)
                .bind(car_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (id, submission) = match existing {
            Some(id) => {
                // A resubmission counts as new for ordering
                sqlx::query(
                    "UPDATE feedback SET rating = ?2, comment = ?3, created_at = ?4 WHERE id = ?1",
                )
                .bind(id)
                .bind(rating)
                .bind(comment)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                (id, Submission::Updated)
            }
            None => {
                let result = sqlx::query(
                    r#"
                    INSERT INTO feedback (user_id, car_id, rating, comment, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )
                .bind(user_id)
                .bind(car_id)
                .bind(rating)
                .bind(comment)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await?;
                (result.last_insert_rowid(), Submission::Created)
            }
        };

        let feedback = sqlx::query_as::<_, Feedback>(&format!(
            "SELECT {FEEDBACK_COLUMNS} FROM feedback WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok((feedback, submission))
    }

    /// Feedback on a car with reviewer names, newest first.
    pub async fn list_for_car(&self, car_id: i64) -> DbResult<Vec<CarReview>> {
        let reviews = sqlx::query_as::<_, CarReview>(
            r#"
            SELECT f.id, f.user_id, f.car_id, f.rating, f.comment, f.created_at,
                   u.name AS user_name
            FROM feedback f
            JOIN users u ON u.id = f.user_id
            WHERE f.car_id = ?1
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(car_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// Average rating (one decimal) and review count for a car.
    pub async fn rating_summary(&self, car_id: i64) -> DbResult<RatingSummary> {
        let (sum, count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(rating), 0), COUNT(*) FROM feedback WHERE car_id = ?1",
        )
        .bind(car_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(RatingSummary::from_totals(sum, count))
    }

    /// The caller's own feedback with car names, newest first.
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<MyFeedback>> {
        let feedback = sqlx::query_as::<_, MyFeedback>(
            r#"
            SELECT f.id, f.car_id, f.rating, f.comment, f.created_at,
                   c.name AS car_name, c.image AS car_image
            FROM feedback f
            JOIN cars c ON c.id = f.car_id
            WHERE f.user_id = ?1
            ORDER BY f.created_at DESC, f.id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(feedback)
    }

    /// All feedback with reviewer and car data, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<FeedbackOverview>> {
        let feedback = sqlx::query_as::<_, FeedbackOverview>(&format!(
            "{OVERVIEW_SELECT} ORDER BY f.created_at DESC, f.id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(feedback)
    }

    /// One feedback entry with reviewer and car data.
    pub async fn get_details(&self, id: i64) -> DbResult<Option<FeedbackOverview>> {
        let feedback = sqlx::query_as::<_, FeedbackOverview>(&format!(
            "{OVERVIEW_SELECT} WHERE f.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(feedback)
    }

    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting feedback");

        let result = sqlx::query("DELETE FROM feedback WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Feedback", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_car, seed_user};
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_resubmission_replaces() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Toyota RAV4", 7500).await;

        let (first, s1) = db.feedback().upsert(user, car, 3, Some("ok")).await.unwrap();
        let (second, s2) = db.feedback().upsert(user, car, 5, None).await.unwrap();

        assert_eq!(s1, Submission::Created);
        assert_eq!(s2, Submission::Updated);
        assert_eq!(first.id, second.id);
        assert_eq!(second.rating, 5);
        assert_eq!(second.comment, None);
        assert_eq!(db.feedback().list_for_car(car).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rating_summary() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let car = seed_car(&db, "Honda Pilot", 8500).await;

        let empty = db.feedback().rating_summary(car).await.unwrap();
        assert_eq!(empty.total_reviews, 0);
        assert_eq!(empty.average_rating, 0.0);

        for (email, rating) in [("a@x.io", 5), ("b@x.io", 4), ("c@x.io", 4)] {
            let user = seed_user(&db, email).await;
            db.feedback().upsert(user, car, rating, None).await.unwrap();
        }

        let summary = db.feedback().rating_summary(car).await.unwrap();
        assert_eq!(summary.total_reviews, 3);
        assert_eq!(summary.average_rating, 4.3);
    }

    #[tokio::test]
    async fn test_rating_out_of_range_rejected_by_schema() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Nissan Altima", 5800).await;

        assert!(matches!(
            db.feedback().upsert(user, car, 6, None).await,
            Err(DbError::CheckViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_overview_and_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = seed_user(&db, "ann@example.com").await;
        let car = seed_car(&db, "Mazda CX-5", 7000).await;
        let (feedback, _) = db.feedback().upsert(user, car, 4, Some("Smooth")).await.unwrap();

        let details = db.feedback().get_details(feedback.id).await.unwrap().unwrap();
        assert_eq!(details.car_name, "Mazda CX-5");
        assert_eq!(details.user_email, "ann@example.com");
        assert_eq!(details.car_price.cents(), 7000);

        let mine = db.feedback().list_for_user(user).await.unwrap();
        assert_eq!(mine[0].car_name, "Mazda CX-5");

        db.feedback().delete(feedback.id).await.unwrap();
        assert!(matches!(
            db.feedback().delete(feedback.id).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(db.feedback().list_all().await.unwrap().is_empty());
    }
}
