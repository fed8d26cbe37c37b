use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed action set of §6, integer-encoded for wire compatibility. Only
/// [`Action::Buy`], [`Action::Sell`], [`Action::BuySell`], [`Action::Flat`] and
/// [`Action::StopPriceReached`] cause an order to be created; the rest are reporting-only flags
/// the Trade Manager passes through to the tracker.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Action {
    NoAction = 0,
    Delay = 1,
    PreBuy = 2,
    Buy = 3,
    PreSell = 4,
    Sell = 5,
    BuyLost = 6,
    SellLost = 7,
    BuySell = 8,
    Hold = 9,
    Flat = 10,
    StopPriceReached = 11,
}

impl Action {
    /// Whether this action causes the Trade Manager to create an order (§4.6 step 5).
    pub fn creates_order(self) -> bool {
        matches!(
            self,
            Action::Buy | Action::Sell | Action::BuySell | Action::Flat | Action::StopPriceReached
        )
    }
}

/// Return value of [`crate::Strategy::process`] (§4.5).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySignal {
    pub action: Action,
    pub quantity: Decimal,
    pub stop_price: Option<Decimal>,
}

impl StrategySignal {
    pub fn no_action() -> Self {
        Self {
            action: Action::NoAction,
            quantity: Decimal::ZERO,
            stop_price: None,
        }
    }

    pub fn buy(quantity: Decimal, stop_price: Option<Decimal>) -> Self {
        Self {
            action: Action::Buy,
            quantity,
            stop_price,
        }
    }

    pub fn flat(quantity: Decimal) -> Self {
        Self {
            action: Action::Flat,
            quantity,
            stop_price: None,
        }
    }
}
