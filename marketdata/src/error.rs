use crate::aggregator::AggregatorError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketDataError {
    #[error(transparent)]
    Aggregator(#[from] AggregatorError),

    #[error("instrument {0} is blocked after repeated resubscription failures (DATA_ERROR)")]
    DataErrorBlocked(String),
}
