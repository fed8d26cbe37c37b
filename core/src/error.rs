//! Central error type aggregating every subsystem the Trade Manager drives.

use algotrade_broker::BrokerError;
use algotrade_marketdata::MarketDataError;
use algotrade_order::OrderError;
use algotrade_persistence::PersistenceError;
use algotrade_strategy::StrategyError;
use thiserror::Error;

/// Aggregates every subsystem error the Trade Manager can observe while processing one tick
/// (§7). Variants are non-fatal unless paired with [`algotrade_integration::Unrecoverable`] on
/// the wrapped value.
#[derive(Debug, Error)]
pub enum TradingError {
    #[error("broker error: {0}")]
    Broker(#[from] BrokerError),

    #[error("order error: {0}")]
    Order(#[from] OrderError),

    #[error("market data error: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("a communication channel's receiver was dropped")]
    RxDropped,

    #[error("no strategy factory registered for class {0:?}")]
    UnknownStrategyClass(String),

    #[error("background task join failed: {0}")]
    JoinError(String),
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for TradingError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Self::RxDropped
    }
}

impl From<tokio::task::JoinError> for TradingError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::JoinError(format!("{value:?}"))
    }
}
