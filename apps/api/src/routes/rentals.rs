//! Cart, checkout, and rental endpoints. All require a bearer token.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use wheels_core::{CartLine, DateRange, Rental, RentalDetails, RentalOverview, RentalStatus};
use wheels_db::CheckoutReceipt;

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

// -- Request types --

/// Body of `POST /cart` and `POST /rentals`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub car_id: i64,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

impl BookingRequest {
    fn range(&self) -> ApiResult<DateRange> {
        Ok(DateRange::parse(&self.start_date, &self.end_date)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct CartAddedResponse {
    pub id: i64,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub receipt: CheckoutReceipt,
}

// -- Handlers --

/// GET /api/rentals/cart
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<CartLine>>> {
    Ok(Json(state.db.bookings().list_cart(auth.user_id).await?))
}

/// POST /api/rentals/cart
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<CartAddedResponse>)> {
    let range = req.range()?;
    let id = state
        .db
        .bookings()
        .add_to_cart(auth.user_id, req.car_id, &range)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CartAddedResponse {
            id,
            message: "Added to cart",
        }),
    ))
}

/// DELETE /api/rentals/cart/{id}
pub async fn remove_from_cart(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    state.db.bookings().remove_from_cart(id, auth.user_id).await?;
    Ok(Json(MessageResponse::new("Removed from cart")))
}

/// POST /api/rentals/checkout
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn checkout(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<CheckoutResponse>> {
    let receipt = state.db.bookings().checkout(auth.user_id).await?;
    Ok(Json(CheckoutResponse {
        message: "Checkout successful",
        receipt,
    }))
}

/// POST /api/rentals: reserve directly, bypassing the cart.
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn reserve(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<BookingRequest>,
) -> ApiResult<(StatusCode, Json<Rental>)> {
    let range = req.range()?;
    let rental = state
        .db
        .bookings()
        .reserve(auth.user_id, req.car_id, &range)
        .await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

/// GET /api/rentals/my-rentals
pub async fn my_rentals(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RentalDetails>>> {
    Ok(Json(state.db.bookings().list_my_rentals(auth.user_id).await?))
}

/// GET /api/rentals/all (admin)
pub async fn all_rentals(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RentalOverview>>> {
    Ok(Json(
        state.db.bookings().list_all_rentals(&auth.identity()).await?,
    ))
}

/// PUT /api/rentals/{id}/status (admin)
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Rental>> {
    auth.require_admin()?;
    let status: RentalStatus = req.status.parse()?;
    let rental = state
        .db
        .bookings()
        .update_status(&auth.identity(), id, status)
        .await?;
    Ok(Json(rental))
}

/// POST /api/rentals/{id}/cancel
#[tracing::instrument(skip(state), fields(user_id = auth.user_id))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Rental>> {
    Ok(Json(state.db.bookings().cancel(id, auth.user_id).await?))
}
