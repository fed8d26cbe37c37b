#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    clippy::useless_let_if_seq,
    missing_debug_implementations,
    rust_2018_idioms
)]

//! # algotrade
//!
//! Facade crate re-exporting every subsystem of the algotrade engine under one namespace, for
//! callers who would rather depend on one crate than wire up each `algotrade-*` member
//! individually. The binary at `src/bin/main.rs` is the reference wiring: load
//! [`core::EngineConfig`], build a [`persistence::PersistenceStore`], register a broker adapter
//! and every [`strategy::Strategy`] class, then hand it all to [`core::TradeManager`].

pub use algotrade_analytics as analytics;
pub use algotrade_broker as broker;
pub use algotrade_client as client;
pub use algotrade_core as core;
pub use algotrade_instrument as instrument;
pub use algotrade_integration as integration;
pub use algotrade_marketdata as marketdata;
pub use algotrade_order as order;
pub use algotrade_persistence as persistence;
pub use algotrade_risk as risk;
pub use algotrade_strategies as strategies;
pub use algotrade_strategy as strategy;

// Flat re-export of the symbols most callers reach for first.
pub use algotrade_core::{Command, EngineConfig, EngineEvent, TradeManager};
pub use algotrade_instrument::{Instrument, Side};

/// Single import for the most common engine-construction symbols.
pub mod prelude {
    pub use crate::broker::{BrokerAdapter, BrokerRegistry};
    pub use crate::core::{registry::StrategyRegistry, Command, EngineConfig, EngineEvent, TradeManager};
    pub use crate::instrument::{BrokerId, Instrument, Side};
    pub use crate::persistence::{InMemoryPersistence, PersistenceStore, SqlitePersistence};
    pub use crate::risk::{NoRiskManager, RiskManager};
    pub use crate::strategy::Strategy;
}
