use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifies a concrete broker adapter plugin. Registration happens at compile time in
/// `algotrade-broker`'s `BrokerRegistry`, not by dotted-name dynamic loading, so this is a
/// closed enumeration rather than an open string identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
pub enum BrokerId {
    /// Nelógica ProfitDLL adapter (B3 cash and futures).
    ProfitDll,
    /// Deterministic in-process adapter used by tests and the golden-cross scenario.
    Mock,
}

impl Display for BrokerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BrokerId::ProfitDll => write!(f, "profit_dll"),
            BrokerId::Mock => write!(f, "mock"),
        }
    }
}
