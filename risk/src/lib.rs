#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! Risk review: the pass-through hook orders travel through between the Order Tracker and a
//! Broker Adapter. The engine drives exactly one account (§1), so unlike the teacher's
//! `RiskManager` this is monomorphic over [`OrderDraft`]/[`OrderId`] rather than generic over
//! exchange/instrument key types.

pub mod check;

pub use check::*;

use algotrade_instrument::OrderId;
use algotrade_order::OrderDraft;
use derive_more::{Constructor, Display, From};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An item that passed every configured risk check.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Display, From, Constructor)]
pub struct RiskApproved<T>(pub T);

impl<T> RiskApproved<T> {
    pub fn into_item(self) -> T {
        self.0
    }
}

/// An item rejected by a risk check, carrying the reason.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RiskRefused<T, Reason = String> {
    pub item: T,
    pub reason: Reason,
}

impl<T> RiskRefused<T> {
    pub fn new(item: T, reason: impl Into<String>) -> Self {
        Self {
            item,
            reason: reason.into(),
        }
    }
}

impl<T, Reason> RiskRefused<T, Reason> {
    pub fn into_item(self) -> T {
        self.item
    }
}

/// Reviews an order draft/cancel before it's handed to a Broker Adapter.
pub trait RiskManager: Send + Sync {
    fn check_open(
        &self,
        draft: OrderDraft,
    ) -> Result<RiskApproved<OrderDraft>, RiskRefused<OrderDraft>>;

    fn check_cancel(
        &self,
        order_id: OrderId,
    ) -> Result<RiskApproved<OrderId>, RiskRefused<OrderId>>;
}

/// Approves everything. Default for backtests and for accounts with no configured limits.
#[derive(Debug, Clone, Default)]
pub struct NoRiskManager;

impl RiskManager for NoRiskManager {
    fn check_open(
        &self,
        draft: OrderDraft,
    ) -> Result<RiskApproved<OrderDraft>, RiskRefused<OrderDraft>> {
        Ok(RiskApproved::new(draft))
    }

    fn check_cancel(
        &self,
        order_id: OrderId,
    ) -> Result<RiskApproved<OrderId>, RiskRefused<OrderId>> {
        Ok(RiskApproved::new(order_id))
    }
}

/// Rejects any order draft whose quantity exceeds a fixed ceiling.
#[derive(Debug, Clone)]
pub struct MaxOrderQuantity {
    check: CheckHigherThan<Decimal>,
}

impl MaxOrderQuantity {
    pub fn new(max_quantity: Decimal) -> Self {
        Self {
            check: CheckHigherThan::new(max_quantity),
        }
    }
}

impl RiskManager for MaxOrderQuantity {
    fn check_open(
        &self,
        draft: OrderDraft,
    ) -> Result<RiskApproved<OrderDraft>, RiskRefused<OrderDraft>> {
        match self.check.check(&draft.quantity) {
            Ok(()) => Ok(RiskApproved::new(draft)),
            Err(error) => {
                tracing::debug!(instrument = %draft.instrument, %error, "order refused by risk check");
                Err(RiskRefused::new(draft, error.to_string()))
            }
        }
    }

    fn check_cancel(
        &self,
        order_id: OrderId,
    ) -> Result<RiskApproved<OrderId>, RiskRefused<OrderId>> {
        Ok(RiskApproved::new(order_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrade_instrument::{BrokerId, Instrument, InstrumentKind, Side};
    use rust_decimal_macros::dec;

    fn draft(quantity: rust_decimal::Decimal) -> OrderDraft {
        OrderDraft {
            instrument: Instrument::new("WINFUT", InstrumentKind::Future, BrokerId::Mock, "WINQ25"),
            side: Side::Buy,
            quantity,
            stop_price: None,
            limit_price: None,
        }
    }

    #[test]
    fn no_risk_manager_approves_everything() {
        let manager = NoRiskManager;
        assert!(manager.check_open(draft(dec!(1_000_000))).is_ok());
    }

    #[test]
    fn max_order_quantity_rejects_oversized_orders() {
        let manager = MaxOrderQuantity::new(dec!(100));
        assert!(manager.check_open(draft(dec!(100))).is_ok());
        assert!(manager.check_open(draft(dec!(101))).is_err());
    }
}
