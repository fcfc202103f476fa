//! # Pricing
//!
//! `total = days × price_per_day`, with days counted as whole calendar days
//! between start and end (Jan 1 → Jan 3 is two days).

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::DateRange;

/// Price breakdown for one reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RentalQuote {
    pub days: i64,
    pub daily_rate: Money,
    pub total: Money,
}

/// Prices `range` at `daily_rate`.
///
/// ## Example
/// ```rust
/// use wheels_core::{pricing, DateRange, Money};
///
/// let range = DateRange::parse("2024-01-01", "2024-01-03").unwrap();
/// let quote = pricing::quote(&range, Money::from_dollars(50)).unwrap();
/// assert_eq!(quote.days, 2);
/// assert_eq!(quote.total, Money::from_dollars(100));
/// ```
pub fn quote(range: &DateRange, daily_rate: Money) -> CoreResult<RentalQuote> {
    if daily_rate.is_negative() {
        return Err(ValidationError::Negative {
            field: "pricePerDay".to_string(),
        }
        .into());
    }
    let days = range.days();
    let total = daily_rate
        .checked_times(days)
        .ok_or_else(|| ValidationError::OutOfRange {
            field: "totalPrice".to_string(),
            min: 0,
            max: i64::MAX,
        })?;

    Ok(RentalQuote {
        days,
        daily_rate,
        total,
    })
}
