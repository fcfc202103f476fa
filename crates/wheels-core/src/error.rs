//! # Error Types
//!
//! Domain-specific error types for wheels-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wheels-core errors (this file)                                        │
//! │  ├── CoreError        - Booking rule violations                        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  wheels-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── BookingError     - CoreError | DbError (StorageFailure)           │
//! │                                                                         │
//! │  HTTP errors (apps/api)                                                │
//! │  └── ApiError         - What the client sees (JSON + status)           │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → BookingError → ApiError           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::RentalStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Booking rule violations.
///
/// None of these are retryable: the same request will fail the same way
/// until the underlying state changes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The car is already reserved for an overlapping range.
    ///
    /// ## When This Occurs
    /// - Adding a cart entry whose dates overlap a pending/confirmed/active rental
    /// - Checkout re-validation finds a rental created since the entry was added
    /// - Two checkouts race for the same car; the loser sees this
    ///
    /// ## User Workflow
    /// ```text
    /// Add to Cart (car 3, Jan 1 → Jan 3)
    ///      │
    ///      ▼
    /// Rental #12 holds car 3 for Jan 2 → Jan 5 (confirmed)
    ///      │
    ///      ▼
    /// Conflict { car_id: 3, start: 2024-01-01, end: 2024-01-03 }
    /// ```
    #[error("Car {car_id} is not available from {start} to {end}")]
    Conflict {
        car_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// The user already has an identical entry in the cart.
    #[error("Car {car_id} is already in your cart for {start} to {end}")]
    DuplicateEntry {
        car_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Checkout was requested with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// The requested status change is not an edge of the lifecycle graph.
    #[error("Cannot change rental status from {from} to {to}")]
    InvalidTransition { from: RentalStatus, to: RentalStatus },

    /// Cancellation requested for a rental that is no longer pending/confirmed.
    #[error("Rental {rental_id} is {status} and cannot be cancelled")]
    CannotCancel { rental_id: i64, status: RentalStatus },

    /// Entity lookup failed (or the entity belongs to another user).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    /// The caller is not allowed to perform the operation.
    #[error("Not authorized: {reason}")]
    Unauthorized { reason: String },

    /// Cart has reached the maximum allowed entries.
    #[error("Cart cannot have more than {max} entries")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        CoreError::NotFound { entity, id }
    }

    /// Creates an Unauthorized error.
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        CoreError::Unauthorized {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed email, unparsable date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Date range where the end does not come after the start.
    #[error("End date {end} must be after start date {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_error_messages() {
        let err = CoreError::Conflict {
            car_id: 3,
            start: date("2024-01-01"),
            end: date("2024-01-03"),
        };
        assert_eq!(
            err.to_string(),
            "Car 3 is not available from 2024-01-01 to 2024-01-03"
        );

        let err = CoreError::InvalidTransition {
            from: RentalStatus::Completed,
            to: RentalStatus::Active,
        };
        assert_eq!(
            err.to_string(),
            "Cannot change rental status from completed to active"
        );

        let err = CoreError::not_found("Rental", 42);
        assert_eq!(err.to_string(), "Rental not found: 42");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::InvalidRange {
            start: date("2024-01-03"),
            end: date("2024-01-01"),
        };
        assert_eq!(
            err.to_string(),
            "End date 2024-01-01 must be after start date 2024-01-03"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "email".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
