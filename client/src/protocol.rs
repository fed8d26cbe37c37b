//! The Client Channel wire protocol (§6): a request is a structured document terminated by a
//! single `0x04` byte; a response is either a document followed by `0x04`, or — for binary
//! downloads — a document, a fixed delimiter, a 4-byte big-endian length, then the payload.

use crate::error::ClientChannelError;
use algotrade_core::Command;
use algotrade_instrument::{Instrument, Side, StrategyInstanceId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marks the end of a request document on the wire.
pub const FRAME_TERMINATOR: u8 = 0x04;

/// Precedes the 4-byte length header of a binary payload in a response.
pub const BINARY_DELIMITER: [u8; 12] =
    [0x00, 0xFF, b'm', b't', b'b', b'i', b'n', b'a', b'r', b'y', 0x00, 0xFF];

/// §6's top-level service codes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Service {
    ServerLog = 1,
    TradingCommand = 2,
    StrategyMetadata = 3,
    Backtest = 4,
    AccountActivity = 5,
}

impl TryFrom<u8> for Service {
    type Error = ClientChannelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::ServerLog),
            2 => Ok(Self::TradingCommand),
            3 => Ok(Self::StrategyMetadata),
            4 => Ok(Self::Backtest),
            5 => Ok(Self::AccountActivity),
            other => Err(ClientChannelError::UnknownService(other)),
        }
    }
}

/// One request document: `{service, srvOpId, data}` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRequest {
    pub service: u8,
    #[serde(rename = "srvOpId")]
    pub srv_op_id: u64,
    pub data: serde_json::Value,
}

/// One response: a plain document, or a document paired with a binary payload.
#[derive(Debug, Clone)]
pub enum ClientResponse {
    Document(serde_json::Value),
    Binary {
        document: serde_json::Value,
        payload: Vec<u8>,
    },
}

impl ClientResponse {
    pub fn ok(srv_op_id: u64) -> Self {
        Self::Document(serde_json::json!({ "srvOpId": srv_op_id, "ok": true }))
    }

    pub fn error(srv_op_id: u64, message: impl Into<String>) -> Self {
        Self::Document(serde_json::json!({ "srvOpId": srv_op_id, "ok": false, "error": message.into() }))
    }

    /// Serializes this response in the wire format described at the top of this module.
    pub fn encode(&self) -> Result<Vec<u8>, ClientChannelError> {
        match self {
            Self::Document(document) => {
                let mut bytes = serde_json::to_vec(document)?;
                bytes.push(FRAME_TERMINATOR);
                Ok(bytes)
            }
            Self::Binary { document, payload } => {
                let mut bytes = serde_json::to_vec(document)?;
                bytes.extend_from_slice(&BINARY_DELIMITER);
                bytes.extend_from_slice(&(payload.len() as u32).to_be_bytes());
                bytes.extend_from_slice(payload);
                Ok(bytes)
            }
        }
    }
}

/// §6 service `2`'s subfields, keyed by the `sub` field of the request's `data` document.
#[derive(Debug, Clone, PartialEq)]
pub enum TradingCommand {
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
    UpdateAccountConfig {
        trading_enabled: bool,
    },
    ValidateSignal {
        strategy_id: StrategyInstanceId,
    },
}

#[derive(Debug, Deserialize)]
struct OpenPositionPayload {
    strategy_id: StrategyInstanceId,
    instrument: Instrument,
    side: Side,
    quantity: Decimal,
    stop_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct ClosePositionPayload {
    strategy_id: StrategyInstanceId,
    instrument: Instrument,
}

#[derive(Debug, Deserialize)]
struct UpdateAccountConfigPayload {
    trading_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct ValidateSignalPayload {
    strategy_id: StrategyInstanceId,
}

impl TryFrom<&serde_json::Value> for TradingCommand {
    type Error = ClientChannelError;

    fn try_from(data: &serde_json::Value) -> Result<Self, Self::Error> {
        let sub = data
            .get("sub")
            .and_then(serde_json::Value::as_u64)
            .ok_or(ClientChannelError::UnknownTradingSubCommand(0))? as u8;

        match sub {
            1 => {
                let payload: OpenPositionPayload = serde_json::from_value(data.clone())?;
                Ok(Self::OpenPosition {
                    strategy_id: payload.strategy_id,
                    instrument: payload.instrument,
                    side: payload.side,
                    quantity: payload.quantity,
                    stop_price: payload.stop_price,
                })
            }
            2 => {
                let payload: ClosePositionPayload = serde_json::from_value(data.clone())?;
                Ok(Self::ClosePosition {
                    strategy_id: payload.strategy_id,
                    instrument: payload.instrument,
                })
            }
            5 => {
                let payload: UpdateAccountConfigPayload = serde_json::from_value(data.clone())?;
                Ok(Self::UpdateAccountConfig {
                    trading_enabled: payload.trading_enabled,
                })
            }
            8 => {
                let payload: ValidateSignalPayload = serde_json::from_value(data.clone())?;
                Ok(Self::ValidateSignal {
                    strategy_id: payload.strategy_id,
                })
            }
            other => Err(ClientChannelError::UnknownTradingSubCommand(other)),
        }
    }
}

impl From<TradingCommand> for Command {
    fn from(command: TradingCommand) -> Self {
        match command {
            TradingCommand::OpenPosition {
                strategy_id,
                instrument,
                side,
                quantity,
                stop_price,
            } => Command::OpenPosition {
                strategy_id,
                instrument,
                side,
                quantity,
                stop_price,
            },
            TradingCommand::ClosePosition { strategy_id, instrument } => {
                Command::ClosePosition { strategy_id, instrument }
            }
            TradingCommand::UpdateAccountConfig { trading_enabled } => {
                Command::SetTradingEnabled(trading_enabled)
            }
            TradingCommand::ValidateSignal { strategy_id } => {
                Command::ValidateSignal { strategy_id }
            }
        }
    }
}

/// Wraps a day's log file as the single-entry ZIP payload service `1` responds with (§6).
pub fn zip_log_file(file_name: &str, contents: &[u8]) -> Result<Vec<u8>, ClientChannelError> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    writer.start_file(file_name, options)?;
    std::io::Write::write_all(&mut writer, contents)?;
    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_response_is_terminated_by_0x04() {
        let response = ClientResponse::ok(7);
        let encoded = response.encode().unwrap();
        assert_eq!(*encoded.last().unwrap(), FRAME_TERMINATOR);
    }

    #[test]
    fn binary_response_carries_the_delimiter_and_big_endian_length() {
        let response = ClientResponse::Binary {
            document: serde_json::json!({ "srvOpId": 1 }),
            payload: vec![1, 2, 3, 4],
        };
        let encoded = response.encode().unwrap();
        let delimiter_at = encoded
            .windows(BINARY_DELIMITER.len())
            .position(|window| window == BINARY_DELIMITER)
            .expect("delimiter present");
        let length_bytes = &encoded[delimiter_at + BINARY_DELIMITER.len()..][..4];
        assert_eq!(u32::from_be_bytes(length_bytes.try_into().unwrap()), 4);
        assert_eq!(&encoded[encoded.len() - 4..], &[1, 2, 3, 4]);
    }

    #[test]
    fn validate_signal_sub_command_parses() {
        let data = serde_json::json!({ "sub": 8, "strategy_id": StrategyInstanceId::random() });
        let command = TradingCommand::try_from(&data).unwrap();
        assert!(matches!(command, TradingCommand::ValidateSignal { .. }));
    }

    #[test]
    fn unknown_sub_command_is_rejected() {
        let data = serde_json::json!({ "sub": 99 });
        assert!(TradingCommand::try_from(&data).is_err());
    }
}
