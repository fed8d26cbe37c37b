use crate::aggregator::BarAggregator;
use crate::bar::Bar;
use crate::error::MarketDataError;
use crate::staleness::{StalenessEvent, StalenessTracker};
use algotrade_instrument::{Instrument, StrategyInstanceId};
use algotrade_integration::collection::FnvIndexMap;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Event surfaced by the router to the Trade Manager for one instrument.
#[derive(Debug, Clone)]
pub enum RouterEvent {
    Bar(Bar),
    MarketDataError,
    MarketDataRestore,
    DataErrorBlocked,
}

struct InstrumentRoute {
    subscribers: Vec<StrategyInstanceId>,
    aggregator: BarAggregator,
    staleness: StalenessTracker,
}

/// Owns the (instrument -> subscribers) registry and one [`BarAggregator`] +
/// [`StalenessTracker`] pair per instrument (§4.4). One live broker subscription exists per
/// instrument regardless of subscriber count.
#[derive(Default)]
pub struct MarketDataRouter {
    routes: FnvIndexMap<Instrument, InstrumentRoute>,
}

impl MarketDataRouter {
    pub fn new() -> Self {
        Self {
            routes: FnvIndexMap::default(),
        }
    }

    /// Registers a strategy's interest in `instrument` at `strategy_timeframe`. Idempotent: a
    /// second subscriber for an already-routed instrument just appends to `subscribers` rather
    /// than creating a second aggregator (§8 "Adapter idempotence" mirrored at this layer).
    pub fn subscribe(
        &mut self,
        instrument: Instrument,
        strategy_id: StrategyInstanceId,
        broker_timeframe: Duration,
        strategy_timeframe: Duration,
    ) -> Result<(), MarketDataError> {
        if let Some(route) = self.routes.get_mut(&instrument) {
            if !route.subscribers.contains(&strategy_id) {
                route.subscribers.push(strategy_id);
            }
            return Ok(());
        }

        let aggregator = BarAggregator::new(broker_timeframe, strategy_timeframe)?;
        self.routes.insert(
            instrument,
            InstrumentRoute {
                subscribers: vec![strategy_id],
                aggregator,
                staleness: StalenessTracker::new(broker_timeframe),
            },
        );
        Ok(())
    }

    pub fn unsubscribe(&mut self, instrument: &Instrument, strategy_id: StrategyInstanceId) {
        if let Some(route) = self.routes.get_mut(instrument) {
            route.subscribers.retain(|id| *id != strategy_id);
        }
    }

    pub fn subscribers(&self, instrument: &Instrument) -> &[StrategyInstanceId] {
        self.routes
            .get(instrument)
            .map(|route| route.subscribers.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_blocked(&self, instrument: &Instrument) -> bool {
        self.routes
            .get(instrument)
            .is_some_and(|route| route.staleness.is_blocked())
    }

    /// Feeds one broker-native bar for `instrument`, aggregating it and refreshing staleness.
    /// Returns the bar event(s) to deliver to every subscriber, in order.
    pub fn on_broker_bar(
        &mut self,
        instrument: &Instrument,
        bar: algotrade_broker::BrokerBar,
        now: DateTime<Utc>,
    ) -> Vec<RouterEvent> {
        let Some(route) = self.routes.get_mut(instrument) else {
            return Vec::new();
        };

        let mut events: Vec<RouterEvent> = route
            .aggregator
            .push(bar)
            .into_iter()
            .map(RouterEvent::Bar)
            .collect();

        if route.staleness.on_bar_received(now) == StalenessEvent::MarketDataRestore {
            events.push(RouterEvent::MarketDataRestore);
        }

        events
    }

    /// Call once per Trade Manager iteration during trading hours (§4.4).
    pub fn check_staleness(&mut self, now: DateTime<Utc>) -> Vec<(Instrument, RouterEvent)> {
        let mut out = Vec::new();
        for (instrument, route) in self.routes.iter_mut() {
            match route.staleness.check(now) {
                StalenessEvent::MarketDataError => {
                    out.push((instrument.clone(), RouterEvent::MarketDataError));
                }
                StalenessEvent::None | StalenessEvent::MarketDataRestore | StalenessEvent::DataErrorBlocked => {}
            }
        }
        out
    }

    /// Records a failed resubscription attempt for `instrument`, possibly tripping DATA_ERROR.
    pub fn on_resubscribe_failure(&mut self, instrument: &Instrument) -> Option<RouterEvent> {
        let route = self.routes.get_mut(instrument)?;
        match route.staleness.on_resubscribe_failure() {
            StalenessEvent::DataErrorBlocked => Some(RouterEvent::DataErrorBlocked),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrade_instrument::{BrokerId, InstrumentKind};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn instrument() -> Instrument {
        Instrument::new("WINFUT", InstrumentKind::Future, BrokerId::Mock, "WINQ25")
    }

    #[test]
    fn second_subscriber_reuses_existing_route() {
        let mut router = MarketDataRouter::new();
        let strategy_a = StrategyInstanceId::random();
        let strategy_b = StrategyInstanceId::random();

        router
            .subscribe(
                instrument(),
                strategy_a,
                Duration::from_secs(60),
                Duration::from_secs(60),
            )
            .unwrap();
        router
            .subscribe(
                instrument(),
                strategy_b,
                Duration::from_secs(60),
                Duration::from_secs(60),
            )
            .unwrap();

        assert_eq!(router.subscribers(&instrument()).len(), 2);
    }

    #[test]
    fn broker_bar_produces_in_progress_bar_for_subscribers() {
        let mut router = MarketDataRouter::new();
        let strategy = StrategyInstanceId::random();
        router
            .subscribe(
                instrument(),
                strategy,
                Duration::from_secs(60),
                Duration::from_secs(60),
            )
            .unwrap();

        let bar = algotrade_broker::BrokerBar {
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
            open: dec!(10),
            high: dec!(10),
            low: dec!(10),
            close: dec!(10),
            volume: dec!(1),
        };
        let events = router.on_broker_bar(&instrument(), bar, Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(events.len(), 1);
    }
}
