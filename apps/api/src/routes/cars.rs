//! Catalog endpoints. Reads are public; writes are admin only.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use wheels_core::validation::validate_car_input;
use wheels_core::{Availability, Car, CarInput, CoreError, DateRange};
use wheels_db::CarFilter;

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
}

/// GET /api/cars?category=&available=true
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Car>>> {
    let filter = CarFilter {
        category: query.category,
        available_only: query.available.unwrap_or(false),
    };
    Ok(Json(state.db.cars().list(&filter).await?))
}

/// GET /api/cars/{id}
pub async fn get(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> ApiResult<Json<Car>> {
    let car = state
        .db
        .cars()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::not_found("Car", id))?;
    Ok(Json(car))
}

/// POST /api/cars (admin)
#[tracing::instrument(skip(state, input), fields(admin = auth.user_id))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(input): Json<CarInput>,
) -> ApiResult<(StatusCode, Json<Car>)> {
    auth.require_admin()?;
    let input = validate_car_input(&input)?;

    let car = state.db.cars().insert(&input).await?;
    info!(car_id = car.id, name = %car.name, "Car added");
    Ok((StatusCode::CREATED, Json(car)))
}

/// PUT /api/cars/{id} (admin)
#[tracing::instrument(skip(state, input), fields(admin = auth.user_id))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(input): Json<CarInput>,
) -> ApiResult<Json<Car>> {
    auth.require_admin()?;
    let input = validate_car_input(&input)?;

    let car = state.db.cars().update(id, &input).await?;
    info!(car_id = id, "Car updated");
    Ok(Json(car))
}

/// DELETE /api/cars/{id} (admin)
///
/// A car with rentals or feedback cannot be deleted (409).
#[tracing::instrument(skip(state), fields(admin = auth.user_id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require_admin()?;
    state.db.cars().delete(id).await?;
    info!(car_id = id, "Car deleted");
    Ok(Json(MessageResponse::new("Car deleted successfully")))
}

/// GET /api/cars/{id}/availability?startDate=&endDate=
pub async fn availability(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<Availability>> {
    let range = DateRange::parse(&query.start_date, &query.end_date)?;
    Ok(Json(state.db.bookings().check_availability(id, &range).await?))
}
