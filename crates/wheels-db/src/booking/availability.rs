//! Availability checks.

use sqlx::SqliteExecutor;
use tracing::debug;

use super::{BookingResult, BookingService};
use crate::repository::rental::RentalRepository;
use wheels_core::{availability, Availability, DateRange};

impl BookingService {
    /// Whether `car_id` is free for `range`, with the conflicting rentals.
    ///
    /// ## Errors
    /// `NotFound` when the car does not exist.
    pub async fn check_availability(
        &self,
        car_id: i64,
        range: &DateRange,
    ) -> BookingResult<Availability> {
        self.require_car(car_id).await?;
        let result = availability_on(&self.pool, car_id, range).await?;
        debug!(car_id, range = %range, available = result.available, "Checked availability");
        Ok(result)
    }
}

/// Runs the overlap rule against rentals visible to `executor`.
///
/// Inside a transaction this sees rentals inserted earlier in the same
/// transaction, which is what keeps a multi-entry checkout from booking the
/// same car twice.
pub(super) async fn availability_on<'e, E>(
    executor: E,
    car_id: i64,
    range: &DateRange,
) -> BookingResult<Availability>
where
    E: SqliteExecutor<'e>,
{
    let candidates = RentalRepository::blocking_overlaps(executor, car_id, range).await?;
    Ok(availability::check(range, candidates))
}
