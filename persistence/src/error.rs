use thiserror::Error;

/// Errors surfaced by [`crate::PersistenceStore`] implementations (§4.1).
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(
        "stale strategy state version for strategy {strategy_id}: caller has {given}, store has {current}"
    )]
    StaleVersion {
        strategy_id: String,
        given: u64,
        current: u64,
    },

    #[error("no session recorded for account {account} on {day}")]
    SessionNotFound { account: String, day: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("could not reconnect to the persistence backend after {attempts} attempts")]
    ReconnectExhausted { attempts: u32 },

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
