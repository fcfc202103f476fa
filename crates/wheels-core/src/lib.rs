//! # wheels-core: Pure Business Logic for Wheels Rental
//!
//! This crate holds the booking rules as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Wheels Rental Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  │    /api/cars  /api/rentals  /api/feedback  /api/auth            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Identity + typed requests              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               wheels-db (BookingService, repositories)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ wheels-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐ ┌───────────┐ ┌───────────┐ ┌────────────┐   │   │
//! │  │   │availability│ │ lifecycle │ │  pricing  │ │ validation │   │   │
//! │  │   │  overlap   │ │  status   │ │ days×rate │ │   rules    │   │   │
//! │  │   └────────────┘ └───────────┘ └───────────┘ └────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Car, CartEntry, Rental, DateRange, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`availability`] - The overlap rule for reservations
//! - [`lifecycle`] - Rental status transitions
//! - [`pricing`] - Rental totals
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use wheels_core::{availability, pricing, DateRange, Money};
//!
//! let range = DateRange::parse("2024-01-01", "2024-01-03").unwrap();
//!
//! // No existing rentals: the car is free
//! assert!(availability::check(&range, Vec::new()).available);
//!
//! // $50/day for two days
//! let quote = pricing::quote(&range, Money::from_dollars(50)).unwrap();
//! assert_eq!(quote.total.cents(), 10_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod availability;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use availability::Availability;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pricing::RentalQuote;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum entries allowed in a single cart.
///
/// ## Business Reason
/// Bounds the size of a checkout transaction.
pub const MAX_CART_ENTRIES: usize = 20;

/// Seats assumed when a car is created without a seat count.
pub const DEFAULT_SEATS: i64 = 4;

pub const MAX_SEATS: i64 = 50;

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

pub const MIN_PASSWORD_LEN: usize = 6;
