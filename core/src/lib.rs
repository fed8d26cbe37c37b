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
#![allow(clippy::type_complexity, clippy::too_many_arguments, type_alias_bounds)]

//! # Core - the Trade Manager
//!
//! Wires the Broker Adapter, Order Tracker, Market Data Router, Risk review, Strategy
//! Framework and Persistence Store into one engine loop driving a single account through a
//! single broker connection.
//!
//! ## Processing flow
//!
//! ```text
//! Broker Adapter (market data, account events, order acks)
//!           |
//!      TradeManager::tick
//!           |
//!    Strategy Framework + Risk review
//!           |
//!      Order Tracker
//!           |
//!      Broker Adapter (order requests)
//! ```
//!
//! ## Components
//!
//! - [`config::EngineConfig`]: startup configuration loaded from the process environment.
//! - [`registry::StrategyRegistry`]: compile-time strategy class -> factory lookup, used to
//!   recreate Strategy Instances on recovery.
//! - [`event::EngineEvent`]/[`event::Command`]: operator-submitted commands (client channel,
//!   cron, anything else) routed into the running [`manager::TradeManager`].
//! - [`manager::TradeManager`]: the engine loop itself.
//! - [`shutdown`]: graceful shutdown traits shared across components.
//! - [`logging`]: standardized `tracing` initialisation for the engine binary.
//! - [`error::TradingError`]: the aggregate error every subsystem's error converts into.

/// Typed startup configuration, loaded from the environment (§6).
pub mod config;

/// Defines all possible errors the Trade Manager can observe.
pub mod error;

/// Operator-facing commands and the top-level event the Trade Manager reacts to.
pub mod event;

/// Provides default Core Tracing logging initialisers.
pub mod logging;

/// The engine loop itself.
pub mod manager;

/// Recreates Strategy Instances from their persisted class name.
pub mod registry;

/// Traits and types related to component shutdowns.
pub mod shutdown;

pub use config::EngineConfig;
pub use error::TradingError;
pub use event::{Command, EngineEvent};
pub use manager::TradeManager;
pub use registry::StrategyRegistry;
