use crate::action::{Action, StrategySignal};
use crate::erased::ErasedStrategy;
use algotrade_broker::Portfolio;
use algotrade_instrument::StrategyInstanceId;
use algotrade_marketdata::Bar;
use algotrade_order::Order;
use chrono::{DateTime, Utc};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// One live Strategy Instance: its identity, parameters, current state blob/version, and the
/// boxed plugin driving it. Owns the dirty-check/snapshot bookkeeping and the panic boundary
/// described in §4.5's "Safety" paragraph, so the Trade Manager never has to know a strategy
/// callback can fail.
pub struct StrategyHandle {
    id: StrategyInstanceId,
    parameters: serde_json::Value,
    state: serde_json::Value,
    version: u64,
    dirty: bool,
    errored: bool,
    inner: Box<dyn ErasedStrategy>,
}

impl std::fmt::Debug for StrategyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyHandle")
            .field("id", &self.id)
            .field("class_name", &self.inner.class_name())
            .field("version", &self.version)
            .field("errored", &self.errored)
            .finish()
    }
}

impl StrategyHandle {
    pub fn new<S>(
        id: StrategyInstanceId,
        inner: S,
        parameters: serde_json::Value,
        state: serde_json::Value,
        version: u64,
    ) -> Self
    where
        S: crate::Strategy,
    {
        Self {
            id,
            parameters,
            state,
            version,
            dirty: false,
            errored: false,
            inner: Box::new(inner),
        }
    }

    pub fn id(&self) -> StrategyInstanceId {
        self.id
    }

    pub fn class_name(&self) -> &'static str {
        self.inner.class_name()
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn state(&self) -> &serde_json::Value {
        &self.state
    }

    pub fn parameters(&self) -> &serde_json::Value {
        &self.parameters
    }

    pub fn validate(&self, portfolio: &Portfolio) -> bool {
        self.inner.validate(&self.parameters, portfolio)
    }

    pub fn initialize(&mut self, portfolio: &Portfolio, is_first_init: bool) -> bool {
        self.guarded(|inner, state| inner.initialize(state, portfolio, is_first_init))
            .unwrap_or(false)
    }

    pub fn process(&mut self, bar: Bar, portfolio: &Portfolio) -> StrategySignal {
        let signal = self
            .guarded(|inner, state| inner.process(state, bar, portfolio))
            .unwrap_or_else(StrategySignal::no_action);
        if signal.action != Action::NoAction {
            self.dirty = true;
        }
        signal
    }

    pub fn resume(&mut self, bars_today: &[Bar], portfolio: &Portfolio, now: DateTime<Utc>) -> bool {
        self.guarded(|inner, state| inner.resume(state, bars_today, portfolio, now))
            .unwrap_or(false)
    }

    pub fn on_order_accepted(&mut self, order: &Order) {
        self.guarded(|inner, state| inner.on_order_accepted(state, order));
    }

    pub fn on_order_filled(&mut self, order: &Order, now: DateTime<Utc>) {
        self.guarded(|inner, state| inner.on_order_filled(state, order, now));
    }

    pub fn on_order_error(&mut self, order: &Order) {
        self.guarded(|inner, state| inner.on_order_error(state, order));
    }

    pub fn on_market_data_error(&mut self) {
        self.guarded(|inner, state| inner.on_market_data_error(state));
    }

    pub fn on_market_data_restore(&mut self) {
        self.guarded(|inner, state| inner.on_market_data_restore(state));
    }

    /// Dirty -> snapshot point (§4.5). Returns the state blob and new version to persist via
    /// `put_strategy_state` iff a prior callback actually mutated state or emitted an action.
    pub fn commit(&mut self) -> Option<(serde_json::Value, u64)> {
        if self.dirty {
            self.dirty = false;
            self.version += 1;
            Some((self.state.clone(), self.version))
        } else {
            None
        }
    }

    fn guarded<R>(
        &mut self,
        f: impl FnOnce(&mut Box<dyn ErasedStrategy>, &mut serde_json::Value) -> R,
    ) -> Option<R> {
        if self.errored {
            return None;
        }

        let before = self.state.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| f(&mut self.inner, &mut self.state)));

        match outcome {
            Ok(value) => {
                if self.state != before {
                    self.dirty = true;
                }
                Some(value)
            }
            Err(payload) => {
                self.errored = true;
                tracing::error!(
                    strategy_id = %self.id,
                    class_name = self.inner.class_name(),
                    message = %panic_message(payload.as_ref()),
                    "strategy callback panicked; instance marked errored"
                );
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::StrategySignal;
    use crate::strategy::Strategy;
    use algotrade_broker::Portfolio;
    use serde::{Deserialize, Serialize};

    #[derive(Default, Serialize, Deserialize)]
    struct CounterState {
        calls: u32,
    }

    struct PanicsOnSecondCall;

    impl Strategy for PanicsOnSecondCall {
        type StateSchema = CounterState;

        fn class_name(&self) -> &'static str {
            "PanicsOnSecondCall"
        }

        fn validate(&self, _params: &serde_json::Value, _portfolio: &Portfolio) -> bool {
            true
        }

        fn initialize(
            &mut self,
            _state: &mut Self::StateSchema,
            _portfolio: &Portfolio,
            _is_first_init: bool,
        ) -> bool {
            true
        }

        fn process(
            &mut self,
            state: &mut Self::StateSchema,
            _bar: algotrade_marketdata::Bar,
            _portfolio: &Portfolio,
        ) -> StrategySignal {
            state.calls += 1;
            if state.calls == 2 {
                panic!("boom");
            }
            StrategySignal::no_action()
        }

        fn resume(
            &mut self,
            _state: &mut Self::StateSchema,
            _bars_today: &[algotrade_marketdata::Bar],
            _portfolio: &Portfolio,
            _now: DateTime<Utc>,
        ) -> bool {
            true
        }
    }

    fn bar() -> algotrade_marketdata::Bar {
        algotrade_marketdata::Bar {
            timestamp: Utc::now(),
            open: Default::default(),
            high: Default::default(),
            low: Default::default(),
            close: Default::default(),
            volume: Default::default(),
            closed: true,
        }
    }

    #[test]
    fn panic_in_process_marks_instance_errored_without_propagating() {
        let mut handle = StrategyHandle::new(
            StrategyInstanceId::random(),
            PanicsOnSecondCall,
            serde_json::json!({}),
            serde_json::json!({ "calls": 0 }),
            0,
        );
        let portfolio = Portfolio::default();

        let first = handle.process(bar(), &portfolio);
        assert_eq!(first.action, Action::NoAction);
        assert!(!handle.is_errored());

        let second = handle.process(bar(), &portfolio);
        assert_eq!(second.action, Action::NoAction);
        assert!(handle.is_errored());
    }

    #[test]
    fn commit_returns_none_when_not_dirty() {
        let mut handle = StrategyHandle::new(
            StrategyInstanceId::random(),
            PanicsOnSecondCall,
            serde_json::json!({}),
            serde_json::json!({ "calls": 0 }),
            0,
        );
        assert!(handle.commit().is_none());
        handle.process(bar(), &Portfolio::default());
        assert!(handle.commit().is_some());
    }
}
