use crate::action::StrategySignal;
use crate::strategy::Strategy;
use algotrade_broker::Portfolio;
use algotrade_marketdata::Bar;
use algotrade_order::Order;
use chrono::{DateTime, Utc};

/// Object-safe counterpart of [`Strategy`], bridging its typed `StateSchema` to the
/// `serde_json::Value` the framework actually stores (§4.5: "a mutable mapping with
/// JSON-serializable leaves"). [`crate::StrategyHandle`] holds a `Box<dyn ErasedStrategy>` so
/// the Trade Manager can keep a heterogeneous collection of Strategy Instances of different
/// concrete types in one registry.
pub(crate) trait ErasedStrategy: Send {
    fn class_name(&self) -> &'static str;
    fn validate(&self, params: &serde_json::Value, portfolio: &Portfolio) -> bool;
    fn initialize(&mut self, state: &mut serde_json::Value, portfolio: &Portfolio, is_first_init: bool) -> bool;
    fn process(&mut self, state: &mut serde_json::Value, bar: Bar, portfolio: &Portfolio) -> StrategySignal;
    fn resume(
        &mut self,
        state: &mut serde_json::Value,
        bars_today: &[Bar],
        portfolio: &Portfolio,
        now: DateTime<Utc>,
    ) -> bool;
    fn on_order_accepted(&mut self, state: &mut serde_json::Value, order: &Order);
    fn on_order_filled(&mut self, state: &mut serde_json::Value, order: &Order, now: DateTime<Utc>);
    fn on_order_error(&mut self, state: &mut serde_json::Value, order: &Order);
    fn on_market_data_error(&mut self, state: &mut serde_json::Value);
    fn on_market_data_restore(&mut self, state: &mut serde_json::Value);
}

/// Round-trips `*state` through `S::StateSchema`, defaulting on a missing/corrupt blob rather
/// than panicking — the first `initialize`/`resume` call always observes a well-formed value.
fn typed_state<S: Strategy>(state: &serde_json::Value) -> S::StateSchema {
    serde_json::from_value(state.clone()).unwrap_or_default()
}

fn store_state<S: Strategy>(state: &mut serde_json::Value, typed: &S::StateSchema) {
    if let Ok(value) = serde_json::to_value(typed) {
        *state = value;
    }
}

impl<S: Strategy> ErasedStrategy for S {
    fn class_name(&self) -> &'static str {
        Strategy::class_name(self)
    }

    fn validate(&self, params: &serde_json::Value, portfolio: &Portfolio) -> bool {
        Strategy::validate(self, params, portfolio)
    }

    fn initialize(&mut self, state: &mut serde_json::Value, portfolio: &Portfolio, is_first_init: bool) -> bool {
        let mut typed = typed_state::<S>(state);
        let ok = Strategy::initialize(self, &mut typed, portfolio, is_first_init);
        store_state::<S>(state, &typed);
        ok
    }

    fn process(&mut self, state: &mut serde_json::Value, bar: Bar, portfolio: &Portfolio) -> StrategySignal {
        let mut typed = typed_state::<S>(state);
        let signal = Strategy::process(self, &mut typed, bar, portfolio);
        store_state::<S>(state, &typed);
        signal
    }

    fn resume(
        &mut self,
        state: &mut serde_json::Value,
        bars_today: &[Bar],
        portfolio: &Portfolio,
        now: DateTime<Utc>,
    ) -> bool {
        let mut typed = typed_state::<S>(state);
        let ok = Strategy::resume(self, &mut typed, bars_today, portfolio, now);
        store_state::<S>(state, &typed);
        ok
    }

    fn on_order_accepted(&mut self, state: &mut serde_json::Value, order: &Order) {
        let mut typed = typed_state::<S>(state);
        Strategy::on_order_accepted(self, &mut typed, order);
        store_state::<S>(state, &typed);
    }

    fn on_order_filled(&mut self, state: &mut serde_json::Value, order: &Order, now: DateTime<Utc>) {
        let mut typed = typed_state::<S>(state);
        Strategy::on_order_filled(self, &mut typed, order, now);
        store_state::<S>(state, &typed);
    }

    fn on_order_error(&mut self, state: &mut serde_json::Value, order: &Order) {
        let mut typed = typed_state::<S>(state);
        Strategy::on_order_error(self, &mut typed, order);
        store_state::<S>(state, &typed);
    }

    fn on_market_data_error(&mut self, state: &mut serde_json::Value) {
        let mut typed = typed_state::<S>(state);
        Strategy::on_market_data_error(self, &mut typed);
        store_state::<S>(state, &typed);
    }

    fn on_market_data_restore(&mut self, state: &mut serde_json::Value) {
        let mut typed = typed_state::<S>(state);
        Strategy::on_market_data_restore(self, &mut typed);
        store_state::<S>(state, &typed);
    }
}
