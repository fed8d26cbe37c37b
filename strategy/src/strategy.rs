use crate::action::StrategySignal;
use algotrade_broker::Portfolio;
use algotrade_marketdata::Bar;
use algotrade_order::Order;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Every strategy plugin implements this contract (§4.5). `StateSchema` is the concrete,
/// JSON-serializable record the framework persists and CAS's via `put_strategy_state` — a typed
/// replacement for an opaque string-keyed map (see design note "Dynamic strategy-state mapping
/// -> typed discipline").
pub trait Strategy: Send + 'static {
    type StateSchema: Serialize + DeserializeOwned + Default + Send;

    fn class_name(&self) -> &'static str;

    /// Pre-startup validation; rejection is final for the session until the operator
    /// re-submits.
    fn validate(&self, params: &serde_json::Value, portfolio: &Portfolio) -> bool;

    /// Binds parameters into instance fields and prepares working buffers.
    fn initialize(
        &mut self,
        state: &mut Self::StateSchema,
        portfolio: &Portfolio,
        is_first_init: bool,
    ) -> bool;

    /// The hot path. Must not block on I/O.
    fn process(
        &mut self,
        state: &mut Self::StateSchema,
        bar: Bar,
        portfolio: &Portfolio,
    ) -> StrategySignal;

    /// Called exactly once after a restart, before any live bar is delivered; `state` has
    /// already been rehydrated from the most recent snapshot.
    fn resume(
        &mut self,
        state: &mut Self::StateSchema,
        bars_today: &[Bar],
        portfolio: &Portfolio,
        now: DateTime<Utc>,
    ) -> bool;

    fn on_order_accepted(&mut self, _state: &mut Self::StateSchema, _order: &Order) {}

    fn on_order_filled(&mut self, _state: &mut Self::StateSchema, _order: &Order, _now: DateTime<Utc>) {}

    fn on_order_error(&mut self, _state: &mut Self::StateSchema, _order: &Order) {}

    fn on_market_data_error(&mut self, _state: &mut Self::StateSchema) {}

    fn on_market_data_restore(&mut self, _state: &mut Self::StateSchema) {}
}
