//! Order status guard
//!
//! ```text
//! PENDING ──► PREPARING ──► READY ──► PAID
//!    │            │           │
//!    └────────────┴───────────┴──► CANCELLED
//! ```
//!
//! PAID and CANCELLED are terminal. READY → PAID only happens through the
//! payment recorder.

use shared::models::OrderStatus;
use thiserror::Error;

/// Outcome of an allowed status request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one; nothing to persist
    NoOp,
    Change { from: OrderStatus, to: OrderStatus },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Order is {0} and cannot change status")]
    Terminal(OrderStatus),

    #[error("Order must pass through PREPARING before READY")]
    MustPassThroughPreparing,

    #[error("Cannot change order status from {from} to {to}")]
    NotAllowed { from: OrderStatus, to: OrderStatus },

    #[error("Orders become PAID by recording a payment; use the payment endpoint")]
    PaymentRequired,
}

/// Validate `current → requested`
pub fn transition(
    current: OrderStatus,
    requested: OrderStatus,
) -> Result<Transition, TransitionError> {
    use OrderStatus::*;

    if current == requested {
        return Ok(Transition::NoOp);
    }
    if current.is_terminal() {
        return Err(TransitionError::Terminal(current));
    }

    match (current, requested) {
        (_, Cancelled) | (Pending, Preparing) | (Preparing, Ready) | (Ready, Paid) => {
            Ok(Transition::Change {
                from: current,
                to: requested,
            })
        }
        (Pending, Ready) => Err(TransitionError::MustPassThroughPreparing),
        (from, to) => Err(TransitionError::NotAllowed { from, to }),
    }
}

/// Status change requested by staff (`PATCH /orders/{id}/status`)
///
/// Same rules as [`transition`], except PAID can never be requested directly.
pub fn manual_transition(
    current: OrderStatus,
    requested: OrderStatus,
) -> Result<Transition, TransitionError> {
    if requested == OrderStatus::Paid {
        return Err(TransitionError::PaymentRequired);
    }
    transition(current, requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;

    const ALL: [OrderStatus; 5] = [Pending, Preparing, Ready, Paid, Cancelled];

    #[test]
    fn test_happy_path() {
        assert_eq!(
            transition(Pending, Preparing),
            Ok(Transition::Change { from: Pending, to: Preparing })
        );
        assert_eq!(
            transition(Preparing, Ready),
            Ok(Transition::Change { from: Preparing, to: Ready })
        );
        assert_eq!(
            transition(Ready, Paid),
            Ok(Transition::Change { from: Ready, to: Paid })
        );
    }

    #[test]
    fn test_pending_to_ready_must_pass_through_preparing() {
        let err = transition(Pending, Ready).unwrap_err();
        assert_eq!(err, TransitionError::MustPassThroughPreparing);
        assert!(err.to_string().contains("PREPARING"));
    }

    #[test]
    fn test_cancel_from_any_open_state() {
        for from in [Pending, Preparing, Ready] {
            assert!(matches!(
                transition(from, Cancelled),
                Ok(Transition::Change { to: Cancelled, .. })
            ));
        }
    }

    #[test]
    fn test_terminal_states_reject_every_change() {
        for from in [Paid, Cancelled] {
            for to in ALL.into_iter().filter(|s| *s != from) {
                assert_eq!(transition(from, to), Err(TransitionError::Terminal(from)));
            }
        }
    }

    #[test]
    fn test_same_status_is_noop() {
        for status in ALL {
            assert_eq!(transition(status, status), Ok(Transition::NoOp));
        }
    }

    #[test]
    fn test_backwards_and_skipping_rejected() {
        assert!(matches!(
            transition(Preparing, Pending),
            Err(TransitionError::NotAllowed { .. })
        ));
        assert!(matches!(
            transition(Ready, Preparing),
            Err(TransitionError::NotAllowed { .. })
        ));
        assert!(matches!(
            transition(Pending, Paid),
            Err(TransitionError::NotAllowed { .. })
        ));
        assert!(matches!(
            transition(Preparing, Paid),
            Err(TransitionError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_manual_transition_cannot_request_paid() {
        assert_eq!(
            manual_transition(Ready, Paid),
            Err(TransitionError::PaymentRequired)
        );
        assert!(manual_transition(Ready, Cancelled).is_ok());
        assert_eq!(
            manual_transition(Pending, Ready),
            Err(TransitionError::MustPassThroughPreparing)
        );
    }
}
