use algotrade_integration::Terminal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Order lifecycle state (§3, §4.3). `Terminal` states are never left once entered.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum OrderState {
    Draft,
    Submitting,
    Submitted,
    Accepted,
    Partial,
    Filled,
    Rejected,
    Cancelling,
    Cancelled,
    Error,
}

impl Display for OrderState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderState::Draft => "DRAFT",
            OrderState::Submitting => "SUBMITTING",
            OrderState::Submitted => "SUBMITTED",
            OrderState::Accepted => "ACCEPTED",
            OrderState::Partial => "PARTIAL",
            OrderState::Filled => "FILLED",
            OrderState::Rejected => "REJECTED",
            OrderState::Cancelling => "CANCELLING",
            OrderState::Cancelled => "CANCELLED",
            OrderState::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

impl Terminal for OrderState {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Filled | OrderState::Rejected | OrderState::Cancelled | OrderState::Error
        )
    }
}

/// Events that drive the Order Tracker's state machine (§4.3's "Event" column).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum OrderEvent {
    Submit,
    BrokerAccept,
    BrokerReject,
    SubmitTimeout,
    PartialFill,
    FullFill,
    CancelRequest,
    CancelAck,
    LateFill,
    FatalBrokerError,
}

/// The table in §4.3 is the only source of legal transitions; anything not listed here is
/// rejected with [`IllegalTransition`](crate::error::OrderError::IllegalTransition).
pub fn apply(state: OrderState, event: &OrderEvent) -> Option<OrderState> {
    use OrderEvent::*;
    use OrderState::*;

    match (state, event) {
        (Draft, Submit) => Some(Submitting),
        (Submitting, BrokerAccept) => Some(Submitted),
        (Submitting, BrokerReject) => Some(Rejected),
        (Submitting, SubmitTimeout) => Some(Error),
        (Submitted, PartialFill) => Some(Partial),
        (Submitted, FullFill) => Some(Filled),
        (Submitted, CancelRequest) | (Partial, CancelRequest) => Some(Cancelling),
        (Partial, PartialFill) => Some(Partial),
        (Partial, FullFill) => Some(Filled),
        (Cancelling, CancelAck) => Some(Cancelled),
        (Cancelling, LateFill) => Some(Filled),
        (current, FatalBrokerError) if !current.is_terminal() => Some(Error),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_to_filled() {
        let mut state = OrderState::Draft;
        for event in [
            OrderEvent::Submit,
            OrderEvent::BrokerAccept,
            OrderEvent::FullFill,
        ] {
            state = apply(state, &event).expect("legal transition");
        }
        assert_eq!(state, OrderState::Filled);
    }

    #[test]
    fn illegal_transition_is_rejected() {
        assert_eq!(apply(OrderState::Draft, &OrderEvent::FullFill), None);
        assert_eq!(apply(OrderState::Filled, &OrderEvent::CancelRequest), None);
    }

    #[test]
    fn fatal_error_reachable_from_any_non_terminal_state() {
        for state in [
            OrderState::Draft,
            OrderState::Submitting,
            OrderState::Submitted,
            OrderState::Accepted,
            OrderState::Partial,
            OrderState::Cancelling,
        ] {
            assert_eq!(
                apply(state, &OrderEvent::FatalBrokerError),
                Some(OrderState::Error)
            );
        }
    }

    #[test]
    fn fatal_error_not_reachable_from_terminal_state() {
        for state in [
            OrderState::Filled,
            OrderState::Rejected,
            OrderState::Cancelled,
            OrderState::Error,
        ] {
            assert_eq!(apply(state, &OrderEvent::FatalBrokerError), None);
        }
    }

    #[test]
    fn cancelling_allows_late_fill() {
        assert_eq!(
            apply(OrderState::Cancelling, &OrderEvent::LateFill),
            Some(OrderState::Filled)
        );
    }
}
