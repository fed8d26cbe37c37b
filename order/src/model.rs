use crate::state::OrderState;
use algotrade_instrument::{DealReference, Instrument, OrderId, Side};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single fill against an order. Orders accumulate fills as `PARTIAL`/`FILLED` events arrive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub quantity: Decimal,
    pub price: Decimal,
    pub time: DateTime<Utc>,
}

/// The caller-supplied intent before an [`Order`] is created (§4.3 `create(order_draft)`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub instrument: Instrument,
    pub side: Side,
    pub quantity: Decimal,
    pub stop_price: Option<Decimal>,
    pub limit_price: Option<Decimal>,
}

/// An outstanding or historical order (§3). The Trade Manager is the sole writer of `state`;
/// every transition is persisted via `append_order_event` before the caller observes the new
/// state (§4.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub deal_reference: Option<DealReference>,
    pub instrument: Instrument,
    pub side: Side,
    pub quantity: Decimal,
    pub stop_price: Option<Decimal>,
    pub limit_price: Option<Decimal>,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub fills: Vec<Fill>,
}

impl Order {
    pub fn draft(id: OrderId, draft: OrderDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            deal_reference: None,
            instrument: draft.instrument,
            side: draft.side,
            quantity: draft.quantity,
            stop_price: draft.stop_price,
            limit_price: draft.limit_price,
            state: OrderState::Draft,
            created_at: now,
            last_modified_at: now,
            fills: Vec::new(),
        }
    }

    pub fn filled_quantity(&self) -> Decimal {
        self.fills.iter().map(|fill| fill.quantity).sum()
    }
}

/// Wire-level order state codes from §6, coarser than the internal [`OrderState`] machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum WireOrderState {
    NotSubmitted = 0,
    Delayed = 1,
    Submitting = 2,
    Submitted = 3,
    Executing = 4,
    Rejected = 5,
}

impl From<OrderState> for WireOrderState {
    fn from(state: OrderState) -> Self {
        match state {
            OrderState::Draft => WireOrderState::NotSubmitted,
            OrderState::Submitting => WireOrderState::Submitting,
            OrderState::Submitted | OrderState::Accepted => WireOrderState::Submitted,
            OrderState::Partial | OrderState::Filled | OrderState::Cancelling => {
                WireOrderState::Executing
            }
            OrderState::Rejected | OrderState::Error => WireOrderState::Rejected,
            OrderState::Cancelled => WireOrderState::Executing,
        }
    }
}
