//! # Availability
//!
//! The overlap rule that decides whether a car is free for a date range.
//!
//! ```text
//!   existing (confirmed)      [====== Jan 2 .. Jan 5 ======]
//!   requested          [== Jan 1 .. Jan 3 ==]                 → conflict
//!   requested                                  [Jan 5 .. 7]   → conflict (touching)
//!   requested                                    [Jan 6 .. 8] → free
//! ```
//!
//! Only rentals in a blocking status (pending, confirmed, active) count.
//! The database layer narrows candidates with an indexed query and then runs
//! [`check`] so both paths share one definition of "conflict".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{DateRange, Rental};

/// Result of an availability check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Availability {
    /// `true` iff `conflicts` is empty.
    pub available: bool,
    /// Blocking rentals whose range overlaps the requested one.
    pub conflicts: Vec<Rental>,
}

impl Availability {
    pub fn free() -> Self {
        Availability {
            available: true,
            conflicts: Vec::new(),
        }
    }
}

/// Returns whether `rental` blocks `range`.
///
/// Rentals with an unreadable range (end not after start) are treated as
/// blocking when they are in a blocking status; the schema forbids them, so
/// this only guards against hand-edited rows.
pub fn blocks(rental: &Rental, range: &DateRange) -> bool {
    if !rental.status.is_blocking() {
        return false;
    }
    match rental.range() {
        Ok(existing) => existing.overlaps(range),
        Err(_) => rental.start_date <= range.end() && rental.end_date >= range.start(),
    }
}

/// Filters `rentals` down to the ones that conflict with `range`.
pub fn check<I>(range: &DateRange, rentals: I) -> Availability
where
    I: IntoIterator<Item = Rental>,
{
    let conflicts: Vec<Rental> = rentals
        .into_iter()
        .filter(|rental| blocks(rental, range))
        .collect();

    Availability {
        available: conflicts.is_empty(),
        conflicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::RentalStatus;
    use chrono::Utc;

    fn rental(id: i64, start: &str, end: &str, status: RentalStatus) -> Rental {
        Rental {
            id,
            user_id: 1,
            car_id: 1,
            start_date: start.parse().unwrap(),
            end_date: end.parse().unwrap(),
            total_price: Money::from_cents(10000),
            status,
            created_at: Utc::now(),
        }
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::parse(start, end).unwrap()
    }

    #[test]
    fn test_no_rentals_is_available() {
        let result = check(&range("2024-01-01", "2024-01-03"), Vec::new());
        assert_eq!(result, Availability::free());
    }

    #[test]
    fn test_overlapping_blocking_rental_conflicts() {
        let existing = vec![
            rental(1, "2024-01-02", "2024-01-05", RentalStatus::Confirmed),
            rental(2, "2024-02-01", "2024-02-05", RentalStatus::Pending),
        ];
        let result = check(&range("2024-01-01", "2024-01-03"), existing);
        assert!(!result.available);
        assert_eq!(result.conflicts.len(), 1);
        assert_eq!(result.conflicts[0].id, 1);
    }

    #[test]
    fn test_touching_ranges_conflict() {
        let existing = vec![rental(1, "2024-01-01", "2024-01-03", RentalStatus::Active)];
        assert!(!check(&range("2024-01-03", "2024-01-04"), existing).available);
    }

    #[test]
    fn test_terminal_rentals_never_block() {
        let existing = vec![
            rental(1, "2024-01-01", "2024-01-10", RentalStatus::Completed),
            rental(2, "2024-01-01", "2024-01-10", RentalStatus::Cancelled),
        ];
        assert!(check(&range("2024-01-02", "2024-01-04"), existing).available);
    }
}
