//! Direct reservations and rental status changes.

use tracing::{info, warn};

use super::{availability::availability_on, cart::conflict, commit, BookingResult, BookingService};
use crate::repository::car::CarRepository;
use crate::repository::rental::{NewRental, RentalRepository};
use wheels_core::{
    lifecycle, pricing, CoreError, DateRange, Identity, Rental, RentalDetails, RentalOverview,
    RentalStatus,
};

impl BookingService {
    fn rentals(&self) -> RentalRepository {
        RentalRepository::new(self.pool.clone())
    }

    /// Books a car directly, bypassing the cart. The rental starts `pending`.
    ///
    /// ## Errors
    /// - `NotFound` if the car does not exist
    /// - `Conflict` if a blocking rental overlaps the range
    pub async fn reserve(
        &self,
        user_id: i64,
        car_id: i64,
        range: &DateRange,
    ) -> BookingResult<Rental> {
        let (_gate, mut tx) = self.begin_exclusive().await?;

        let car = CarRepository::find(&mut *tx, car_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Car", car_id))?;

        let availability = availability_on(&mut *tx, car_id, range).await?;
        if !availability.available {
            warn!(user_id, car_id, range = %range, "Reservation conflict");
            return Err(conflict(car_id, range).into());
        }

        let quote = pricing::quote(range, car.price_per_day)?;
        let id = RentalRepository::insert(
            &mut *tx,
            &NewRental {
                user_id,
                car_id,
                range: *range,
                total_price: quote.total,
                status: RentalStatus::Pending,
            },
        )
        .await?;

        let rental = RentalRepository::find(&mut *tx, id)
            .await?
            .ok_or_else(|| CoreError::not_found("Rental", id))?;
        commit(tx).await?;

        info!(user_id, car_id, rental_id = id, total = %quote.total, "Reservation created");
        Ok(rental)
    }

    /// Cancels one of the caller's own rentals.
    ///
    /// ## Errors
    /// - `NotFound` if the rental does not exist
    /// - `Unauthorized` if it belongs to someone else
    /// - `CannotCancel` unless it is `pending` or `confirmed`
    pub async fn cancel(&self, rental_id: i64, user_id: i64) -> BookingResult<Rental> {
        let (_gate, mut tx) = self.begin_exclusive().await?;

        let rental = RentalRepository::find(&mut *tx, rental_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Rental", rental_id))?;

        if rental.user_id != user_id {
            warn!(rental_id, user_id, owner = rental.user_id, "Cancel by non-owner");
            return Err(CoreError::unauthorized("Not your rental").into());
        }
        lifecycle::ensure_cancellable(rental_id, rental.status)?;

        RentalRepository::set_status(&mut *tx, rental_id, rental.status, RentalStatus::Cancelled)
            .await?;
        commit(tx).await?;

        info!(rental_id, user_id, from = %rental.status, "Rental cancelled");
        Ok(Rental {
            status: RentalStatus::Cancelled,
            ..rental
        })
    }

    /// Moves a rental along the lifecycle graph. Admin only.
    ///
    /// ## Errors
    /// - `Unauthorized` if the caller is not an admin
    /// - `NotFound` if the rental does not exist
    /// - `InvalidTransition` if the graph has no edge to `new_status`
    pub async fn update_status(
        &self,
        identity: &Identity,
        rental_id: i64,
        new_status: RentalStatus,
    ) -> BookingResult<Rental> {
        if !identity.is_admin {
            warn!(user_id = identity.user_id, rental_id, "Status change by non-admin");
            return Err(CoreError::unauthorized("Admin access required").into());
        }

        let (_gate, mut tx) = self.begin_exclusive().await?;

        let rental = RentalRepository::find(&mut *tx, rental_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Rental", rental_id))?;
        lifecycle::ensure_transition(rental.status, new_status)?;

        RentalRepository::set_status(&mut *tx, rental_id, rental.status, new_status).await?;
        commit(tx).await?;

        info!(rental_id, from = %rental.status, to = %new_status, "Rental status updated");
        Ok(Rental {
            status: new_status,
            ..rental
        })
    }

    /// The user's rentals with car data, newest first.
    pub async fn list_my_rentals(&self, user_id: i64) -> BookingResult<Vec<RentalDetails>> {
        Ok(self.rentals().list_for_user(user_id).await?)
    }

    /// Every rental with car and renter data. Admin only.
    pub async fn list_all_rentals(&self, identity: &Identity) -> BookingResult<Vec<RentalOverview>> {
        if !identity.is_admin {
            return Err(CoreError::unauthorized("Admin access required").into());
        }
        Ok(self.rentals().list_all().await?)
    }
}
