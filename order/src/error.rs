use crate::state::OrderState;
use algotrade_instrument::OrderId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("order {order} has no legal transition for this event from state {from}")]
    IllegalTransition { order: OrderId, from: OrderState },

    #[error("unknown order {0}")]
    UnknownOrder(OrderId),

    #[error("submit of order {0} timed out waiting for broker accept/reject")]
    SubmitTimeout(OrderId),

    #[error("persistence rejected the transition for order {0}: {1}")]
    PersistenceFailed(OrderId, String),
}
