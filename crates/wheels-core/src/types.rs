//! # Domain Types
//!
//! Core domain types used throughout Wheels Rental.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Car        │   │   CartEntry     │   │     Rental      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  car_id (FK)    │   │  car_id (FK)    │       │
//! │  │  price_per_day  │   │  user_id (FK)   │   │  total_price    │       │
//! │  │  is_available   │   │  start / end    │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   DateRange     │   │  RentalStatus   │   │    Identity     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  start < end    │   │  Pending        │   │  user_id        │       │
//! │  │  inclusive      │   │  Confirmed      │   │  is_admin       │       │
//! │  │  overlap test   │   │  Active         │   └─────────────────┘       │
//! │  └─────────────────┘   │  Completed      │                              │
//! │                        │  Cancelled      │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All ids are SQLite `INTEGER PRIMARY KEY` values. Dates are calendar dates
//! with no time zone; timestamps are UTC.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Identity
// =============================================================================

/// The authenticated caller, as resolved by the HTTP layer.
///
/// The booking service trusts this value; it never looks at tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: i64,
    pub is_admin: bool,
}

impl Identity {
    pub const fn user(user_id: i64) -> Self {
        Identity {
            user_id,
            is_admin: false,
        }
    }

    pub const fn admin(user_id: i64) -> Self {
        Identity {
            user_id,
            is_admin: true,
        }
    }
}

// =============================================================================
// Car
// =============================================================================

/// A car in the rental catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: i64,
    pub name: String,
    /// Free-form category ("suv", "sedan", "van", ...).
    pub category: String,
    /// Daily rate in cents.
    pub price_per_day: Money,
    /// Image URL or path; the catalog never stores image bytes.
    pub image: Option<String>,
    pub description: Option<String>,
    pub seats: i64,
    /// Listing flag. Date availability is decided by rentals, not by this.
    pub is_available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a car.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CarInput {
    pub name: String,
    pub category: String,
    pub price_per_day: Money,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seats")]
    pub seats: i64,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_seats() -> i64 {
    crate::DEFAULT_SEATS
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Rental Status
// =============================================================================

/// Lifecycle status of a rental.
///
/// See [`crate::lifecycle`] for the allowed transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    /// Reserved directly, awaiting confirmation.
    Pending,
    /// Created by checkout or confirmed by an admin.
    Confirmed,
    /// Car has been picked up.
    Active,
    /// Car has been returned. Terminal.
    Completed,
    /// Reservation withdrawn. Terminal.
    Cancelled,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 5] = [
        RentalStatus::Pending,
        RentalStatus::Confirmed,
        RentalStatus::Active,
        RentalStatus::Completed,
        RentalStatus::Cancelled,
    ];

    /// Statuses that hold the car and therefore block overlapping reservations.
    pub const BLOCKING: [RentalStatus; 3] = [
        RentalStatus::Pending,
        RentalStatus::Confirmed,
        RentalStatus::Active,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a rental in this status occupies the car.
    pub const fn is_blocking(&self) -> bool {
        matches!(
            self,
            RentalStatus::Pending | RentalStatus::Confirmed | RentalStatus::Active
        )
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Cancelled)
    }
}

impl Default for RentalStatus {
    fn default() -> Self {
        RentalStatus::Pending
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RentalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: RentalStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive calendar range `[start, end]` with `end > start`.
///
/// Only constructible through [`DateRange::new`], so the ordering always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "String")]
    start: NaiveDate,
    #[ts(as = "String")]
    end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `end <= start`.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use wheels_core::DateRange;
    ///
    /// let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let jan3 = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
    ///
    /// assert_eq!(DateRange::new(jan1, jan3).unwrap().days(), 2);
    /// assert!(DateRange::new(jan3, jan1).is_err());
    /// assert!(DateRange::new(jan1, jan1).is_err());
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end <= start {
            return Err(ValidationError::InvalidRange { start, end });
        }
        Ok(DateRange { start, end })
    }

    /// Parses two ISO `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = parse_date("startDate", start)?;
        let end = parse_date("endDate", end)?;
        DateRange::new(start, end)
    }

    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whole days between start and end. Always at least 1.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Inclusive overlap: `s1 <= e2 && e1 >= s2`.
    ///
    /// Ranges that merely touch (one ends on the day the other starts)
    /// overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Cart
// =============================================================================

/// A tentative reservation request sitting in a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A cart entry joined with the car's current catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub id: i64,
    pub car_id: i64,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub car_name: String,
    pub category: String,
    pub price_per_day: Money,
    pub image: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CartLine {
    /// The entry's date range, if the stored dates are well-formed.
    pub fn range(&self) -> Result<DateRange, ValidationError> {
        DateRange::new(self.start_date, self.end_date)
    }
}

// =============================================================================
// Rental
// =============================================================================

/// A reservation with a locked-in price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    /// Price fixed at creation; later catalog changes do not touch it.
    pub total_price: Money,
    pub status: RentalStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Rental {
    pub fn range(&self) -> Result<DateRange, ValidationError> {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// A rental joined with car data, for the renter's own listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalDetails {
    pub id: i64,
    pub car_id: i64,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub total_price: Money,
    pub status: RentalStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub car_name: String,
    pub image: Option<String>,
    pub category: String,
}

/// A rental joined with car and renter data, for the admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalOverview {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    #[ts(as = "String")]
    pub start_date: NaiveDate,
    #[ts(as = "String")]
    pub end_date: NaiveDate,
    pub total_price: Money,
    pub status: RentalStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub car_name: String,
    pub user_name: String,
    pub user_email: String,
}

// =============================================================================
// User
// =============================================================================

/// A registered account. The password hash never leaves wheels-db.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            is_admin: self.is_admin,
        }
    }
}

// =============================================================================
// Feedback
// =============================================================================

/// A user's rating of a car. One per (user, car).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Feedback on a car with the reviewer's name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CarReview {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub user_name: String,
}

/// Feedback written by the caller, with the car it is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MyFeedback {
    pub id: i64,
    pub car_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub car_name: String,
    pub car_image: Option<String>,
}

/// Feedback with reviewer and car data, for administrators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOverview {
    pub id: i64,
    pub user_id: i64,
    pub car_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: String,
    pub car_name: String,
    pub car_category: String,
    pub car_price: Money,
    pub car_description: Option<String>,
}

/// Aggregate rating of a car.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal; 0 when there are no reviews.
    pub average_rating: f64,
    pub total_reviews: i64,
}

impl RatingSummary {
    /// Builds a summary from the rating sum and count.
    ///
    /// ## Example
    /// ```rust
    /// use wheels_core::RatingSummary;
    ///
    /// let summary = RatingSummary::from_totals(14, 3); // 4.666...
    /// assert_eq!(summary.average_rating, 4.7);
    /// assert_eq!(RatingSummary::from_totals(0, 0).average_rating, 0.0);
    /// ```
    pub fn from_totals(sum: i64, count: i64) -> Self {
        if count <= 0 {
            return RatingSummary {
                average_rating: 0.0,
                total_reviews: 0,
            };
        }
        // Integer tenths, rounded half up, then one float division for display.
        let tenths = (sum * 10 * 2 + count) / (count * 2);
        RatingSummary {
            average_rating: tenths as f64 / 10.0,
            total_reviews: count,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
