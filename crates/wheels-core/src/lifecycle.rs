//! # Rental Lifecycle
//!
//! The status state machine.
//!
//! ```text
//!   pending ──► confirmed ──► active ──► completed
//!      │            │
//!      └────────────┴──► cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Self-transitions are not edges.

use crate::error::{CoreError, CoreResult};
use crate::types::RentalStatus;

/// Statuses reachable from `from` in one step.
pub const fn next_statuses(from: RentalStatus) -> &'static [RentalStatus] {
    match from {
        RentalStatus::Pending => &[RentalStatus::Confirmed, RentalStatus::Cancelled],
        RentalStatus::Confirmed => &[RentalStatus::Active, RentalStatus::Cancelled],
        RentalStatus::Active => &[RentalStatus::Completed],
        RentalStatus::Completed | RentalStatus::Cancelled => &[],
    }
}

pub fn can_transition(from: RentalStatus, to: RentalStatus) -> bool {
    next_statuses(from).contains(&to)
}

/// Fails with `InvalidTransition` unless `from -> to` is an edge.
pub fn ensure_transition(from: RentalStatus, to: RentalStatus) -> CoreResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

/// Fails with `CannotCancel` unless the rental is pending or confirmed.
///
/// An active rental is not cancellable by its owner even though the car is
/// still out; it has to be completed.
pub fn ensure_cancellable(rental_id: i64, status: RentalStatus) -> CoreResult<()> {
    match status {
        RentalStatus::Pending | RentalStatus::Confirmed => Ok(()),
        _ => Err(CoreError::CannotCancel { rental_id, status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RentalStatus::*;

    #[test]
    fn test_graph_edges() {
        assert!(can_transition(Pending, Confirmed));
        assert!(can_transition(Pending, Cancelled));
        assert!(can_transition(Confirmed, Active));
        assert!(can_transition(Confirmed, Cancelled));
        assert!(can_transition(Active, Completed));

        assert!(!can_transition(Pending, Active));
        assert!(!can_transition(Active, Cancelled));
        assert!(!can_transition(Completed, Active));
        assert!(!can_transition(Cancelled, Pending));
    }

    #[test]
    fn test_self_transitions_rejected() {
        for status in RentalStatus::ALL {
            assert!(matches!(
                ensure_transition(status, status),
                Err(CoreError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for status in RentalStatus::ALL {
            assert_eq!(status.is_terminal(), next_statuses(status).is_empty());
        }
    }

    #[test]
    fn test_cancellable_statuses() {
        assert!(ensure_cancellable(1, Pending).is_ok());
        assert!(ensure_cancellable(1, Confirmed).is_ok());
        for status in [Active, Completed, Cancelled] {
            match ensure_cancellable(9, status) {
                Err(CoreError::CannotCancel { rental_id, status: s }) => {
                    assert_eq!(rental_id, 9);
                    assert_eq!(s, status);
                }
                other => panic!("expected CannotCancel, got {other:?}"),
            }
        }
    }
}
