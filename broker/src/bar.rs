use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A broker-native OHLCV sample (§3 `Bar`), delivered via `on_market_data` at the adapter's
/// native timeframe. The Market Data Router promotes these into strategy-native bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrokerBar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl BrokerBar {
    /// OHLC consistency invariant from §8: `low <= min(open, close) <= max(open, close) <= high`
    /// and `volume >= 0`.
    pub fn is_consistent(&self) -> bool {
        let lo = self.open.min(self.close);
        let hi = self.open.max(self.close);
        self.low <= lo && hi <= self.high && self.volume >= Decimal::ZERO
    }
}
