//! # Wheels API
//!
//! REST server for the Wheels car rental backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          API Routes (/api)                              │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  /auth         │  │  /cars         │  │  /rentals                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • list / get   │  │ • cart (get/add/remove)    ││
//! │  │ • login        │  │ • availability │  │ • checkout                 ││
//! │  │ • me / profile │  │ • admin CRUD   │  │ • reserve / cancel         ││
//! │  └────────────────┘  └────────────────┘  │ • my-rentals / all / status││
//! │                                          └────────────────────────────┘│
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  /feedback     │  │  /health       │                                │
//! │  │ • per car      │  │ • SELECT 1     │                                │
//! │  │ • submit       │  │                │                                │
//! │  │ • admin views  │  │                │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  AuthUser extractor ── Bearer JWT ──► Identity { user_id, is_admin }   │
//! │  wheels-db::Database ── BookingService / repositories ──► SQLite       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (see [`config::ApiConfig::load`]):
//! - `HOST` / `PORT` - bind address (default: 0.0.0.0:5000)
//! - `DATABASE_PATH` - SQLite file (default: ./wheels.db)
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - token lifetime (default: 604800)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` / `ADMIN_NAME` - bootstrap admin

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use wheels_db::{Database, DbConfig};

use crate::auth::{hash_password, JwtManager};
use crate::config::{AdminAccount, ApiConfig};
use crate::error::ApiError;

// Re-exports
pub use config::ConfigError;
pub use error::{ApiResult, ErrorCode};

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
}

impl AppState {
    pub fn new(db: Database, config: &ApiConfig) -> Self {
        AppState {
            db,
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs),
        }
    }
}

/// Opens the database, runs migrations, and ensures the bootstrap admin.
pub async fn build_state(config: &ApiConfig) -> anyhow::Result<Arc<AppState>> {
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.database_max_connections),
    )
    .await?;

    if let Some(admin) = &config.admin {
        ensure_admin(&db, admin).await?;
    }

    Ok(Arc::new(AppState::new(db, config)))
}

/// Creates the admin account if no user has its email.
///
/// An existing non-admin account with that email is left alone.
pub async fn ensure_admin(db: &Database, admin: &AdminAccount) -> Result<(), ApiError> {
    let email = wheels_core::validation::validate_email(&admin.email)?;

    match db.users().get_credentials_by_email(&email).await? {
        Some(existing) if existing.is_admin => Ok(()),
        Some(existing) => {
            warn!(user_id = existing.id, "Admin email belongs to a non-admin account");
            Ok(())
        }
        None => {
            let hash = hash_password(&admin.password)?;
            let user = db.users().insert(&admin.name, &email, &hash, true).await?;
            info!(user_id = user.id, "Admin account created");
            Ok(())
        }
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::check))
        // Accounts
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/me", get(routes::auth::me))
        .route("/api/auth/profile", put(routes::auth::update_profile))
        // Catalog
        .route(
            "/api/cars",
            get(routes::cars::list).post(routes::cars::create),
        )
        .route(
            "/api/cars/{id}",
            get(routes::cars::get)
                .put(routes::cars::update)
                .delete(routes::cars::delete),
        )
        .route("/api/cars/{id}/availability", get(routes::cars::availability))
        // Cart, checkout, rentals
        .route("/api/rentals", post(routes::rentals::reserve))
        .route(
            "/api/rentals/cart",
            get(routes::rentals::get_cart).post(routes::rentals::add_to_cart),
        )
        .route("/api/rentals/cart/{id}", delete(routes::rentals::remove_from_cart))
        .route("/api/rentals/checkout", post(routes::rentals::checkout))
        .route("/api/rentals/my-rentals", get(routes::rentals::my_rentals))
        .route("/api/rentals/all", get(routes::rentals::all_rentals))
        .route("/api/rentals/{id}/status", put(routes::rentals::update_status))
        .route("/api/rentals/{id}/cancel", post(routes::rentals::cancel))
        // Feedback
        .route("/api/feedback", post(routes::feedback::submit))
        .route("/api/feedback/car/{car_id}", get(routes::feedback::for_car))
        .route("/api/feedback/car/{car_id}/rating", get(routes::feedback::rating))
        .route("/api/feedback/my-feedback", get(routes::feedback::mine))
        .route("/api/feedback/all", get(routes::feedback::all))
        .route("/api/feedback/details/{id}", get(routes::feedback::details))
        .route("/api/feedback/{id}", delete(routes::feedback::delete))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
