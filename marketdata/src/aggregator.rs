use crate::bar::Bar;
use algotrade_broker::BrokerBar;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;
use std::time::Duration;

/// Promotes broker-native bars into one strategy-native timeframe (§4.4 "Aggregation rule").
/// `strategy_timeframe` MUST be an exact multiple of `broker_timeframe` — this is validated once
/// at construction (`validate`-time rejection, per the open question in §9).
pub struct BarAggregator {
    broker_timeframe: Duration,
    strategy_timeframe: Duration,
    window: Option<WindowAccumulator>,
}

#[derive(Debug, Clone, Copy)]
struct WindowAccumulator {
    start: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl WindowAccumulator {
    fn start_new(start: DateTime<Utc>, bar: &BrokerBar) -> Self {
        Self {
            start,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }

    fn absorb(&mut self, bar: &BrokerBar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
    }

    fn to_bar(self, closed: bool) -> Bar {
        Bar {
            timestamp: self.start,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            closed,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AggregatorError {
    #[error(
        "strategy timeframe {strategy:?} is not an exact multiple of broker timeframe {broker:?}"
    )]
    NotAMultiple { broker: Duration, strategy: Duration },
}

impl BarAggregator {
    pub fn new(broker_timeframe: Duration, strategy_timeframe: Duration) -> Result<Self, AggregatorError> {
        if strategy_timeframe.as_nanos() == 0
            || broker_timeframe.as_nanos() == 0
            || strategy_timeframe.as_nanos() % broker_timeframe.as_nanos() != 0
        {
            return Err(AggregatorError::NotAMultiple {
                broker: broker_timeframe,
                strategy: strategy_timeframe,
            });
        }
        Ok(Self {
            broker_timeframe,
            strategy_timeframe,
            window: None,
        })
    }

    fn window_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        let width = ChronoDuration::from_std(self.strategy_timeframe).expect("fits");
        let epoch = DateTime::<Utc>::from_timestamp(0, 0).expect("valid epoch");
        let elapsed = timestamp - epoch;
        let width_ns = width.num_nanoseconds().expect("fits i64");
        let elapsed_ns = elapsed.num_nanoseconds().expect("fits i64");
        let bucket = elapsed_ns.div_euclid(width_ns);
        epoch + ChronoDuration::nanoseconds(bucket * width_ns)
    }

    /// Feeds one broker-native bar. Returns, in order: the now-closed previous window's bar (if
    /// this input started a new window) followed by the in-progress bar for the window this
    /// input belongs to (§4.4: "emits one in-progress bar with closed=false on every broker bar
    /// inside the window").
    pub fn push(&mut self, bar: BrokerBar) -> Vec<Bar> {
        let start = self.window_start(bar.timestamp);
        let mut out = Vec::with_capacity(2);

        match self.window {
            Some(current) if current.start == start => {
                let mut updated = current;
                updated.absorb(&bar);
                self.window = Some(updated);
                out.push(updated.to_bar(false));
            }
            Some(current) => {
                out.push(current.to_bar(true));
                let fresh = WindowAccumulator::start_new(start, &bar);
                self.window = Some(fresh);
                out.push(fresh.to_bar(false));
            }
            None => {
                let fresh = WindowAccumulator::start_new(start, &bar);
                self.window = Some(fresh);
                out.push(fresh.to_bar(false));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn broker_bar(minute: i64, close: Decimal) -> BrokerBar {
        BrokerBar {
            timestamp: Utc.timestamp_opt(minute * 60, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1),
        }
    }

    #[test]
    fn rejects_non_multiple_timeframes() {
        let result = BarAggregator::new(Duration::from_secs(60), Duration::from_secs(90));
        assert!(result.is_err());
    }

    #[test]
    fn aggregates_three_one_minute_bars_into_one_three_minute_bar() {
        let mut aggregator =
            BarAggregator::new(Duration::from_secs(60), Duration::from_secs(180)).unwrap();

        let mut closed = None;
        for (i, close) in [dec!(10), dec!(11), dec!(9)].into_iter().enumerate() {
            let out = aggregator.push(broker_bar(i as i64, close));
            assert!(out.iter().all(|bar| !bar.closed));
            closed = out.last().copied();
        }
        // fourth bar starts a new window, closing the first.
        let out = aggregator.push(broker_bar(3, dec!(12)));
        let closed_bar = out.first().copied().unwrap();
        assert!(closed_bar.closed);
        assert_eq!(closed_bar.open, dec!(10));
        assert_eq!(closed_bar.close, dec!(9));
        assert_eq!(closed_bar.high, dec!(11));
        assert_eq!(closed_bar.low, dec!(9));
        assert_eq!(closed_bar.volume, dec!(3));
        assert!(closed.is_some());
    }
}
