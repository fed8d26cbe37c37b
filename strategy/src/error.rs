use algotrade_instrument::StrategyInstanceId;
use thiserror::Error;

/// Errors surfaced to the Trade Manager around a Strategy Instance's lifecycle, distinct from
/// the panic-catching "Safety" path in [`crate::StrategyHandle`], which never returns a `Result`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StrategyError {
    #[error("strategy {strategy_id} rejected at validate(): {reason}")]
    ValidationFailed {
        strategy_id: StrategyInstanceId,
        reason: String,
    },

    #[error("strategy {0} is errored and accepts no further actions until reset")]
    InstanceErrored(StrategyInstanceId),

    #[error("unknown strategy instance {0}")]
    UnknownInstance(StrategyInstanceId),
}
