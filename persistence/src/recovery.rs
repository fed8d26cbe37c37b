use algotrade_instrument::{Instrument, Session, StrategyInstanceId};
use algotrade_marketdata::Bar;
use algotrade_order::Order;
use serde::{Deserialize, Serialize};

/// A Strategy Instance's durable record: its class/parameters (needed to re-instantiate it) and
/// its most recent versioned state blob (§4.1, §4.5 "Recovery").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStateRecord {
    pub strategy_id: StrategyInstanceId,
    pub class_name: String,
    pub parameters: serde_json::Value,
    pub state_blob: serde_json::Value,
    pub version: u64,
}

/// Result of `load_recovery_context` (§4.1): everything the engine needs at startup to
/// re-create a day's Strategy Instances, rehydrate their state, reconcile open orders against
/// the broker's portfolio, and replay the day's bar log into `resume` (§4.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryContext {
    pub session: Session,
    pub strategies: Vec<StrategyStateRecord>,
    pub open_orders: Vec<Order>,
    pub bar_log: Vec<(Instrument, Bar)>,
}
