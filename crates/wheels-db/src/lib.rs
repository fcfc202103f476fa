//! # wheels-db: Storage and Booking Layer for Wheels Rental
//!
//! SQLite storage through sqlx, the repositories over it, and the
//! [`BookingService`] that turns carts into rentals without double-booking.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Wheels Rental Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /api/rentals/checkout)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     wheels-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │ BookingService│    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (booking/)    │    │  (embedded)  │  │   │
//! │  │   │               │    │       │       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│  Repositories │    │ 001_init.sql │  │   │
//! │  │   │ Gate (Mutex)  │    │ car/cart/...  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   ./wheels.db                                                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (car, cart, rental, ...)
//! - [`booking`] - Availability, cart, checkout, and rental lifecycle
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wheels_db::{Database, DbConfig};
//! use wheels_core::DateRange;
//!
//! let db = Database::new(DbConfig::new("./wheels.db")).await?;
//!
//! let range = DateRange::parse("2024-01-01", "2024-01-03")?;
//! db.bookings().add_to_cart(user_id, car_id, &range).await?;
//! let receipt = db.bookings().checkout(user_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod booking;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use booking::{BookingError, BookingResult, BookingService, CheckoutReceipt};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::car::{CarFilter, CarRepository};
pub use repository::cart::CartRepository;
pub use repository::feedback::{FeedbackRepository, Submission};
pub use repository::rental::{NewRental, RentalRepository};
pub use repository::user::{UserCredentials, UserRepository};
