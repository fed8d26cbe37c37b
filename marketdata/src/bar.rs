use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Strategy-native OHLCV sample (§3). Invariant (§3, enforced by [`crate::aggregator`]): within
/// one Strategy Instance's bar stream, timestamps strictly increase, and a `closed` bar is never
/// followed by another bar carrying the same timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub closed: bool,
}

impl Bar {
    /// §8 universal property: `low <= min(open, close) <= max(open, close) <= high`, `volume >= 0`.
    pub fn is_consistent(&self) -> bool {
        let lo = self.open.min(self.close);
        let hi = self.open.max(self.close);
        self.low <= lo && hi <= self.high && self.volume >= Decimal::ZERO
    }
}

impl From<algotrade_broker::BrokerBar> for Bar {
    fn from(bar: algotrade_broker::BrokerBar) -> Self {
        Self {
            timestamp: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            closed: true,
        }
    }
}
