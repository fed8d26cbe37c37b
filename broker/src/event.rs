use crate::error::BrokerError;
use algotrade_instrument::{DealReference, Instrument, OrderId};
use algotrade_integration::snapshot::Snapshot;
use algotrade_order::BrokerOrderEvent;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Account/portfolio state as last reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    pub supported_history_timeframes: Vec<std::time::Duration>,
    pub supported_data_timeframes: Vec<std::time::Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub quantity: Decimal,
    pub average_price: Decimal,
    pub unrealized_pnl: Option<Decimal>,
}

/// Portfolio Snapshot (§3): mapping from instrument to position, authoritative at the broker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub positions: HashMap<String, PortfolioPosition>,
}

/// A disconnect reason code (§4.2): `1` = retry cap exhausted (channel now `FAILED`), `2` =
/// transient loss of a previously `CONNECTED` channel (retries indefinitely).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum DisconnectCode {
    RetryCapExhausted = 1,
    TransientLoss = 2,
}

/// Every `on_*` callback named in §4.2 collapsed into one channel the Trade Manager drains once
/// per tick, per the "Callback-style asynchrony -> channels" design note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrokerEvent {
    AccountInfo(AccountInfo),
    Portfolio(Snapshot<Portfolio>),
    MarketDataSubscribed {
        instrument: Instrument,
        ok: bool,
        error: Option<BrokerError>,
    },
    MarketData {
        instrument: Instrument,
        bar: crate::bar::BrokerBar,
    },
    MarketDataError {
        instrument: Instrument,
    },
    MarketDataRestore {
        instrument: Instrument,
    },
    Order {
        order_id: OrderId,
        event: BrokerOrderEvent,
        at: DateTime<Utc>,
    },
    AccountDisconnected {
        code: DisconnectCode,
    },
}

/// Placeholder carried with accepted orders before `BrokerOrderEvent::Accepted` is observed.
pub type PendingDealReference = Option<DealReference>;
