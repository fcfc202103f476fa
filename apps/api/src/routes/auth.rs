//! Account endpoints: register, login, current user, profile.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wheels_core::validation::{validate_email, validate_password, validate_user_name};
use wheels_core::User;
use wheels_db::DbError;

use crate::auth::{hash_password, verify_password, AuthUser};
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::AppState;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    #[serde(default)]
    pub current_password: Option<String>,
    #[serde(default)]
    pub new_password: Option<String>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// -- Handlers --

/// POST /api/auth/register
#[tracing::instrument(skip(state, req), fields(email = %req.email))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let name = validate_user_name(&req.name)?;
    let email = validate_email(&req.email)?;
    validate_password(&req.password)?;

    let hash = hash_password(&req.password)?;
    let user = state
        .db
        .users()
        .insert(&name, &email, &hash, false)
        .await
        .map_err(|err| match err {
            DbError::UniqueViolation { .. } => {
                ApiError::new(ErrorCode::DuplicateEntry, "Email already exists")
            }
            other => other.into(),
        })?;

    let token = state.jwt.issue(&user)?;
    info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

/// POST /api/auth/login
///
/// Unknown email and wrong password produce the same response.
#[tracing::instrument(skip(state, req))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::unauthenticated("Invalid credentials");

    let email = req.email.trim().to_lowercase();
    let creds = state
        .db
        .users()
        .get_credentials_by_email(&email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &creds.password_hash) {
        warn!(user_id = creds.id, "Failed login");
        return Err(invalid());
    }

    let user = creds.into_user();
    let token = state.jwt.issue(&user)?;
    info!(user_id = user.id, "User logged in");
    Ok(Json(AuthResponse { token, user }))
}

/// GET /api/auth/me
pub async fn me(State(state): State<Arc<AppState>>, auth: AuthUser) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users()
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(user))
}

/// PUT /api/auth/profile
///
/// Changing the password requires the current one.
#[tracing::instrument(skip(state, req), fields(user_id = auth.user_id))]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<ProfileRequest>,
) -> ApiResult<Json<User>> {
    let name = validate_user_name(&req.name)?;
    let users = state.db.users();

    let new_hash = match req.new_password.as_deref() {
        None | Some("") => None,
        Some(new_password) => {
            let creds = users
                .get_credentials_by_id(auth.user_id)
                .await?
                .ok_or_else(|| ApiError::not_found("User not found"))?;

            let current = req.current_password.as_deref().unwrap_or_default();
            if !verify_password(current, &creds.password_hash) {
                warn!("Password change with wrong current password");
                return Err(ApiError::new(
                    ErrorCode::Validation,
                    "Current password is incorrect",
                ));
            }

            validate_password(new_password)?;
            Some(hash_password(new_password)?)
        }
    };

    let user = users
        .update_profile(auth.user_id, &name, new_hash.as_deref())
        .await?;
    info!(password_changed = new_hash.is_some(), "Profile updated");
    Ok(Json(user))
}
