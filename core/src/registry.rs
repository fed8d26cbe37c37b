//! Recreates Strategy Instances by their persisted `class_name` (§4.1 "Recovery on startup", §4.5).
//! Mirrors [`algotrade_broker::BrokerRegistry`]'s compile-time plugin-loading pattern: registration
//! happens once at startup, in `main`, rather than through any dynamic/dotted-name loader.

use algotrade_instrument::StrategyInstanceId;
use algotrade_integration::collection::FnvIndexMap;
use algotrade_strategy::{Strategy, StrategyHandle};

type Factory = Box<
    dyn Fn(StrategyInstanceId, serde_json::Value, serde_json::Value, u64) -> StrategyHandle
        + Send
        + Sync,
>;

#[derive(Default)]
pub struct StrategyRegistry {
    factories: FnvIndexMap<&'static str, Factory>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            factories: FnvIndexMap::default(),
        }
    }

    /// Registers a strategy class under `class_name`. `factory` must produce a fresh, freshly
    /// parameterless instance each call — per-instance configuration travels through `parameters`
    /// at `build` time, not through the factory closure.
    pub fn register<S, F>(&mut self, class_name: &'static str, factory: F)
    where
        S: Strategy,
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.factories.insert(
            class_name,
            Box::new(move |id, parameters, state, version| {
                StrategyHandle::new(id, factory(), parameters, state, version)
            }),
        );
    }

    pub fn build(
        &self,
        class_name: &str,
        id: StrategyInstanceId,
        parameters: serde_json::Value,
        state: serde_json::Value,
        version: u64,
    ) -> Option<StrategyHandle> {
        self.factories
            .get(class_name)
            .map(|factory| factory(id, parameters, state, version))
    }

    pub fn registered(&self) -> impl Iterator<Item = &&'static str> {
        self.factories.keys()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("registered", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrade_broker::Portfolio;
    use algotrade_marketdata::Bar;
    use algotrade_strategy::StrategySignal;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    #[derive(Default, Serialize, Deserialize)]
    struct NoopState;

    #[derive(Clone)]
    struct NoopStrategy;

    impl Strategy for NoopStrategy {
        type StateSchema = NoopState;

        fn class_name(&self) -> &'static str {
            "noop"
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
            _state: &mut Self::StateSchema,
            _bar: Bar,
            _portfolio: &Portfolio,
        ) -> StrategySignal {
            StrategySignal::no_action()
        }

        fn resume(
            &mut self,
            _state: &mut Self::StateSchema,
            _bars_today: &[Bar],
            _portfolio: &Portfolio,
            _now: DateTime<Utc>,
        ) -> bool {
            true
        }
    }

    #[test]
    fn builds_a_registered_class_by_name() {
        let mut registry = StrategyRegistry::new();
        registry.register("noop", || NoopStrategy);

        let handle = registry.build(
            "noop",
            StrategyInstanceId::random(),
            serde_json::json!({}),
            serde_json::Value::Null,
            3,
        );
        assert!(handle.is_some());
        assert_eq!(handle.unwrap().version(), 3);
    }

    #[test]
    fn unknown_class_name_yields_none() {
        let registry = StrategyRegistry::new();
        assert!(registry
            .build(
                "missing",
                StrategyInstanceId::random(),
                serde_json::Value::Null,
                serde_json::Value::Null,
                0
            )
            .is_none());
    }
}
