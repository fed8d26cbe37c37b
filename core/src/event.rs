//! External inputs the Trade Manager's loop reacts to, besides the [`algotrade_broker::BrokerEvent`]
//! queue drained once per tick directly from the adapter (§5 "a single typed event channel
//! drained once per loop tick" — that queue already plays this role for broker-originated
//! events; this module covers the operator-originated side of §6's command table).

use crate::shutdown::Shutdown;
use algotrade_instrument::{Instrument, OrderId, Side, StrategyInstanceId};
use algotrade_integration::Terminal;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of §6's command table, submitted over the client channel (§4.7) or any other
/// operator-facing surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    OpenPosition {
        strategy_id: StrategyInstanceId,
        instrument: Instrument,
        side: Side,
        quantity: Decimal,
        stop_price: Option<Decimal>,
    },
    ClosePosition {
        strategy_id: StrategyInstanceId,
        instrument: Instrument,
    },
    CancelOrder {
        order_id: OrderId,
    },
    SetTradingEnabled(bool),
    ValidateSignal {
        strategy_id: StrategyInstanceId,
    },
}

/// Top-level event processed by [`crate::manager::TradeManager::handle_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    Shutdown(Shutdown),
    Command(Command),
}

impl EngineEvent {
    pub fn shutdown() -> Self {
        Self::Shutdown(Shutdown)
    }
}

impl Terminal for EngineEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Shutdown(_))
    }
}

impl From<Command> for EngineEvent {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_shutdown_is_terminal() {
        assert!(EngineEvent::shutdown().is_terminal());
        assert!(!EngineEvent::from(Command::SetTradingEnabled(false)).is_terminal());
    }
}
