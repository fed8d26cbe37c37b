use derive_more::{Constructor, Display, From};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The single trading account this engine instance drives (§1: one process, one account).
#[derive(
    Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, From, Serialize, Deserialize,
)]
pub struct AccountId(pub String);

/// Engine-side identifier for a live binding of a strategy class to an instrument and parameter
/// set (a Strategy Instance, §3).
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Display,
    Constructor,
    Serialize,
    Deserialize,
)]
pub struct StrategyInstanceId(pub Uuid);

impl StrategyInstanceId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Engine-side order identifier, stable across the order's lifecycle. The broker-issued "deal
/// reference" is a separate opaque field set only once the order is accepted (§3).
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Display,
    Constructor,
    Serialize,
    Deserialize,
)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Opaque broker-issued identifier for an accepted order, returned on accept.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Display, From, Serialize, Deserialize)]
pub struct DealReference(pub String);
