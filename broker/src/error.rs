use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of normalized error codes every concrete adapter MUST translate its own
/// broker's errors into (§4.2). `OK` is not itself an error; it appears in wire acks.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Error)]
pub enum BrokerError {
    #[error("ok")]
    Ok,
    #[error("broker-side error")]
    Broker,
    #[error("network error")]
    Network,
    #[error("invalid instrument")]
    InvalidInstrument,
    #[error("invalid timeframe")]
    InvalidTimeframe,
    #[error("not connected")]
    NotConnected,
    #[error("authentication failed")]
    Auth,
    #[error("general error")]
    General,
}

impl BrokerError {
    /// `BROKER`, `NETWORK`, `NOT_CONNECTED` are retryable from the engine's perspective (§4.2).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BrokerError::Broker | BrokerError::Network | BrokerError::NotConnected
        )
    }

    /// `INVALID_*` codes are permanent for the affected instrument until reconfigured.
    pub fn is_permanent_for_instrument(&self) -> bool {
        matches!(
            self,
            BrokerError::InvalidInstrument | BrokerError::InvalidTimeframe
        )
    }
}

impl algotrade_integration::Unrecoverable for BrokerError {
    /// `AUTH` is fatal for the session (§4.2, §7).
    fn is_unrecoverable(&self) -> bool {
        matches!(self, BrokerError::Auth)
    }
}
