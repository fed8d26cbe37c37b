use thiserror::Error;

/// Errors produced by the channel, collection and stream primitives in this crate.
///
/// Component-specific errors (broker, order, market data, persistence, strategy) wrap their
/// own `thiserror` enums and do not route through `SocketError` directly; this type exists for
/// the handful of transport-adjacent failures that are genuinely generic.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SocketError {
    #[error("sink closed: {0}")]
    Sink(String),

    #[error("deserialising message failed: {error}, for payload: {payload}")]
    Deserialise { error: String, payload: String },

    #[error("serialising message failed: {0}")]
    Serialise(String),
}
