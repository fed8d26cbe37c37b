//! Errors surfaced while framing, parsing, or serving the Client Channel wire protocol.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientChannelError {
    #[error("i/o error on client connection: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown service code {0}")]
    UnknownService(u8),

    #[error("unknown trading sub-command code {0}")]
    UnknownTradingSubCommand(u8),

    #[error("the reply channel for a pending request was dropped before a response arrived")]
    ReplyDropped,

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
