//! Ratings and reviews.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use wheels_core::validation::{validate_comment, validate_rating};
use wheels_core::{CarReview, CoreError, Feedback, FeedbackOverview, MyFeedback, RatingSummary};
use wheels_db::Submission;

use super::MessageResponse;
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub car_id: i64,
    pub rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: &'static str,
    pub feedback: Feedback,
}

/// GET /api/feedback/car/{car_id}
pub async fn for_car(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<i64>,
) -> ApiResult<Json<Vec<CarReview>>> {
    Ok(Json(state.db.feedback().list_for_car(car_id).await?))
}

/// GET /api/feedback/car/{car_id}/rating
pub async fn rating(
    State(state): State<Arc<AppState>>,
    Path(car_id): Path<i64>,
) -> ApiResult<Json<RatingSummary>> {
    Ok(Json(state.db.feedback().rating_summary(car_id).await?))
}

/// POST /api/feedback. One review per (user, car); resubmitting replaces it.
#[tracing::instrument(skip(state, req), fields(user_id = auth.user_id, car_id = req.car_id))]
pub async fn submit(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<FeedbackRequest>,
) -> ApiResult<(StatusCode, Json<FeedbackResponse>)> {
    validate_rating(req.rating)?;
    let comment = validate_comment(req.comment.as_deref())?;

    if state.db.cars().get_by_id(req.car_id).await?.is_none() {
        return Err(CoreError::not_found("Car", req.car_id).into());
    }

    let (feedback, submission) = state
        .db
        .feedback()
        .upsert(auth.user_id, req.car_id, req.rating, comment.as_deref())
        .await?;

    info!(feedback_id = feedback.id, ?submission, "Feedback saved");
    let response = match submission {
        Submission::Created => (
            StatusCode::CREATED,
            Json(FeedbackResponse {
                message: "Feedback added successfully",
                feedback,
            }),
        ),
        Submission::Updated => (
            StatusCode::OK,
            Json(FeedbackResponse {
                message: "Feedback updated successfully",
                feedback,
            }),
        ),
    };
    Ok(response)
}

/// GET /api/feedback/my-feedback
pub async fn mine(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<MyFeedback>>> {
    Ok(Json(state.db.feedback().list_for_user(auth.user_id).await?))
}

/// GET /api/feedback/all (admin)
pub async fn all(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<FeedbackOverview>>> {
    auth.require_admin()?;
    Ok(Json(state.db.feedback().list_all().await?))
}

/// GET /api/feedback/details/{id} (admin)
pub async fn details(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<FeedbackOverview>> {
    auth.require_admin()?;
    let feedback = state
        .db
        .feedback()
        .get_details(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Feedback not found"))?;
    Ok(Json(feedback))
}

/// DELETE /api/feedback/{id} (admin)
#[tracing::instrument(skip(state), fields(admin = auth.user_id))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require_admin()?;
    state.db.feedback().delete(id).await?;
    info!(feedback_id = id, "Feedback deleted");
    Ok(Json(MessageResponse::new("Feedback deleted successfully")))
}
