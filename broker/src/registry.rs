use crate::adapter::{BrokerAdapter, BrokerEventReceiver};
use algotrade_instrument::BrokerId;
use algotrade_integration::collection::FnvIndexMap;

type Factory = Box<dyn Fn() -> (Box<dyn BrokerAdapter>, BrokerEventReceiver) + Send + Sync>;

/// Replaces the source's dotted-name dynamic loader with a compile-time table keyed by
/// [`BrokerId`] (Design Note "Plugin loading -> registry"). Registration happens once, in an
/// init hook per adapter, the way the source registers each broker plugin on startup. A factory
/// produces both the adapter and the receiver half of its event channel, mirroring
/// [`crate::mock::MockBrokerAdapter::new`]'s constructor shape.
pub struct BrokerRegistry {
    factories: FnvIndexMap<BrokerId, Factory>,
}

impl Default for BrokerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerRegistry {
    pub fn new() -> Self {
        Self {
            factories: FnvIndexMap::default(),
        }
    }

    pub fn register(
        &mut self,
        id: BrokerId,
        factory: impl Fn() -> (Box<dyn BrokerAdapter>, BrokerEventReceiver) + Send + Sync + 'static,
    ) {
        self.factories.insert(id, Box::new(factory));
    }

    pub fn build(&self, id: BrokerId) -> Option<(Box<dyn BrokerAdapter>, BrokerEventReceiver)> {
        self.factories.get(&id).map(|factory| factory())
    }

    pub fn registered(&self) -> impl Iterator<Item = &BrokerId> {
        self.factories.keys()
    }
}

impl std::fmt::Debug for BrokerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerRegistry")
            .field("registered", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBrokerAdapter;

    #[test]
    fn registers_and_builds_mock_adapter() {
        let mut registry = BrokerRegistry::new();
        registry.register(BrokerId::Mock, || {
            let (adapter, events) = MockBrokerAdapter::new();
            (Box::new(adapter) as Box<dyn BrokerAdapter>, events)
        });

        assert!(registry.build(BrokerId::Mock).is_some());
        assert!(registry.build(BrokerId::ProfitDll).is_none());
    }
}
