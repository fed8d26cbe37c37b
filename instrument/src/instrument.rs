use crate::broker_id::BrokerId;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable engine-side symbol for a tradable instrument, with a per-adapter mapping to the
/// broker-native symbol ("epic", per the glossary). Invariant (§3): an `Instrument` subscribed
/// by one or more strategies has exactly one live subscription with the adapter — enforced by
/// the Market Data Router's subscription registry, not by this type itself.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// Engine-side identifier, stable across broker reconnects and process restarts.
    pub symbol: String,
    pub kind: InstrumentKind,
    pub broker: BrokerId,
    /// The broker-native identifier ("epic") this `Instrument` maps to for `broker`.
    pub broker_symbol: String,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        kind: InstrumentKind,
        broker: BrokerId,
        broker_symbol: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            broker,
            broker_symbol: broker_symbol.into(),
        }
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}/{})", self.symbol, self.broker, self.broker_symbol)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum InstrumentKind {
    Spot,
    Future,
    Option,
}

impl Display for InstrumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrumentKind::Spot => write!(f, "spot"),
            InstrumentKind::Future => write!(f, "future"),
            InstrumentKind::Option => write!(f, "option"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_symbol_and_broker_mapping() {
        let instrument = Instrument::new("WINFUT", InstrumentKind::Future, BrokerId::Mock, "WINQ25");
        assert_eq!(instrument.to_string(), "WINFUT(mock/WINQ25)");
    }
}
