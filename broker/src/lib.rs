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
#![allow(clippy::type_complexity, clippy::too_many_arguments)]

//! Broker Adapter abstraction (§4.2): the contract any broker plugin implements, a compile-time
//! [`registry::BrokerRegistry`], a fully deterministic [`mock::MockBrokerAdapter`] for tests, and
//! a [`profit_dll::ProfitDllAdapter`] whose wire protocol is injected (out of scope per §1).

pub mod adapter;
pub mod bar;
pub mod connection;
pub mod error;
pub mod event;
pub mod mock;
pub mod profit_dll;
pub mod registry;

pub use adapter::{BrokerAdapter, BrokerEventReceiver, BrokerEventSender};
pub use bar::BrokerBar;
pub use error::BrokerError;
pub use event::{AccountInfo, BrokerEvent, DisconnectCode, Portfolio, PortfolioPosition};
pub use mock::MockBrokerAdapter;
pub use registry::BrokerRegistry;
