//! # Validation Module
//!
//! Input validation for catalog, account, and feedback data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP extractors (apps/api)                                   │
//! │  └── JSON shape, date parsing                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  └── Lengths, ranges, formats                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (rating, price, end_date > start_date)          │
//! │  └── UNIQUE constraints (email, cart tuple, feedback per car)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators return the normalized (trimmed) value so callers store exactly
//! what was checked.

use crate::error::ValidationError;
use crate::types::CarInput;
use crate::{MAX_RATING, MAX_SEATS, MIN_PASSWORD_LEN, MIN_RATING};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

fn optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        Some(v) => Ok(Some(v.to_string())),
    }
}

/// Validates a car's display name (1-100 characters).
///
/// ## Example
/// ```rust
/// use wheels_core::validation::validate_car_name;
///
/// assert_eq!(validate_car_name("  Toyota RAV4 ").unwrap(), "Toyota RAV4");
/// assert!(validate_car_name("").is_err());
/// ```
pub fn validate_car_name(name: &str) -> ValidationResult<String> {
    required("name", name, 100)
}

/// Validates a category. Stored lowercased so filters match regardless of case.
pub fn validate_category(category: &str) -> ValidationResult<String> {
    required("category", category, 50).map(|c| c.to_lowercase())
}

/// Validates a person's name (1-100 characters).
pub fn validate_user_name(name: &str) -> ValidationResult<String> {
    required("name", name, 100)
}

/// Validates an email address and returns it lowercased.
///
/// Only the shape `local@domain.tld` is checked; deliverability is not.
///
/// ## Example
/// ```rust
/// use wheels_core::validation::validate_email;
///
/// assert_eq!(validate_email("Ann@Example.com").unwrap(), "ann@example.com");
/// assert!(validate_email("ann@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = required("email", email, 254)?.to_lowercase();

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(|| invalid("missing @"))?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid("malformed address"));
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => {}
        _ => return Err(invalid("domain must contain a dot")),
    }
    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain spaces"));
    }

    Ok(email)
}

/// Validates a new password. Not trimmed: spaces are legal characters.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }
    Ok(())
}

/// Validates an optional feedback comment (up to 1000 characters).
pub fn validate_comment(comment: Option<&str>) -> ValidationResult<Option<String>> {
    optional("comment", comment, 1000)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a star rating.
///
/// ## Example
/// ```rust
/// use wheels_core::validation::validate_rating;
///
/// assert!(validate_rating(5).is_ok());
/// assert!(validate_rating(0).is_err());
/// assert!(validate_rating(6).is_err());
/// ```
pub fn validate_rating(rating: i64) -> ValidationResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::OutOfRange {
            field: "rating".to_string(),
            min: MIN_RATING,
            max: MAX_RATING,
        });
    }
    Ok(())
}

pub fn validate_seats(seats: i64) -> ValidationResult<()> {
    if !(1..=MAX_SEATS).contains(&seats) {
        return Err(ValidationError::OutOfRange {
            field: "seats".to_string(),
            min: 1,
            max: MAX_SEATS,
        });
    }
    Ok(())
}

/// Validates a daily rate in cents. Zero is allowed.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::Negative {
            field: "pricePerDay".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Composite Validators
// =============================================================================

/// Validates and normalizes a full car payload.
pub fn validate_car_input(input: &CarInput) -> ValidationResult<CarInput> {
    validate_price_cents(input.price_per_day.cents())?;
    validate_seats(input.seats)?;

    Ok(CarInput {
        name: validate_car_name(&input.name)?,
        category: validate_category(&input.category)?,
        price_per_day: input.price_per_day,
        image: optional("image", input.image.as_deref(), 500)?,
        description: optional("description", input.description.as_deref(), 2000)?,
        seats: input.seats,
        is_available: input.is_available,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
