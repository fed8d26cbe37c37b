use chrono::{DateTime, Utc};
use std::time::Duration;

/// Maximum consecutive resubscription failures before an instrument is marked `DATA_ERROR` and
/// its strategy blocked (§4.4, §7).
pub const MAX_RESUBSCRIBE_ATTEMPTS: u32 = 5;

/// Tracks "last bar seen" per instrument and the resubscription backoff state, implementing the
/// staleness rule of §4.4: "if no bar for instrument I arrives within `max(5*B, 60s)` during
/// trading hours, emit `on_market_data_error(I)`".
#[derive(Debug, Clone)]
pub struct StalenessTracker {
    broker_timeframe: Duration,
    last_bar_at: Option<DateTime<Utc>>,
    state: StalenessState,
    consecutive_resubscribe_failures: u32,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum StalenessState {
    Fresh,
    Stale,
    DataError,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StalenessEvent {
    None,
    MarketDataError,
    MarketDataRestore,
    DataErrorBlocked,
}

impl StalenessTracker {
    pub fn new(broker_timeframe: Duration) -> Self {
        Self {
            broker_timeframe,
            last_bar_at: None,
            state: StalenessState::Fresh,
            consecutive_resubscribe_failures: 0,
        }
    }

    pub fn staleness_window(&self) -> Duration {
        self.broker_timeframe
            .saturating_mul(5)
            .max(Duration::from_secs(60))
    }

    pub fn on_bar_received(&mut self, now: DateTime<Utc>) -> StalenessEvent {
        self.last_bar_at = Some(now);
        self.consecutive_resubscribe_failures = 0;
        if self.state == StalenessState::Stale {
            self.state = StalenessState::Fresh;
            return StalenessEvent::MarketDataRestore;
        }
        StalenessEvent::None
    }

    /// Call once per Trade Manager iteration, during trading hours.
    pub fn check(&mut self, now: DateTime<Utc>) -> StalenessEvent {
        if self.state == StalenessState::DataError {
            return StalenessEvent::None;
        }
        let Some(last_bar_at) = self.last_bar_at else {
            return StalenessEvent::None;
        };
        let elapsed = (now - last_bar_at)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if elapsed >= self.staleness_window() && self.state == StalenessState::Fresh {
            self.state = StalenessState::Stale;
            return StalenessEvent::MarketDataError;
        }
        StalenessEvent::None
    }

    /// A resubscription attempt failed; after [`MAX_RESUBSCRIBE_ATTEMPTS`] consecutive failures
    /// the instrument is blocked (§4.4).
    pub fn on_resubscribe_failure(&mut self) -> StalenessEvent {
        self.consecutive_resubscribe_failures += 1;
        if self.consecutive_resubscribe_failures >= MAX_RESUBSCRIBE_ATTEMPTS {
            self.state = StalenessState::DataError;
            return StalenessEvent::DataErrorBlocked;
        }
        StalenessEvent::None
    }

    pub fn is_blocked(&self) -> bool {
        self.state == StalenessState::DataError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(s: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(s, 0).unwrap()
    }

    #[test]
    fn staleness_window_is_at_least_60s() {
        let tracker = StalenessTracker::new(Duration::from_secs(1));
        assert_eq!(tracker.staleness_window(), Duration::from_secs(60));
    }

    #[test]
    fn emits_error_then_restore() {
        let mut tracker = StalenessTracker::new(Duration::from_secs(10));
        assert_eq!(tracker.on_bar_received(t(0)), StalenessEvent::None);
        assert_eq!(tracker.check(t(30)), StalenessEvent::None);
        assert_eq!(tracker.check(t(61)), StalenessEvent::MarketDataError);
        assert_eq!(
            tracker.on_bar_received(t(65)),
            StalenessEvent::MarketDataRestore
        );
    }

    #[test]
    fn blocks_after_five_failures() {
        let mut tracker = StalenessTracker::new(Duration::from_secs(10));
        for _ in 0..4 {
            assert_eq!(tracker.on_resubscribe_failure(), StalenessEvent::None);
        }
        assert_eq!(
            tracker.on_resubscribe_failure(),
            StalenessEvent::DataErrorBlocked
        );
        assert!(tracker.is_blocked());
    }
}
