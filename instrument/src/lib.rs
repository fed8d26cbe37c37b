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

//! Domain-model types shared by every other crate: [`Instrument`](instrument::Instrument),
//! [`Side`](side::Side), [`BrokerId`](broker_id::BrokerId), the Broker Connection State machine,
//! and the [`Session`](session::Session) entity. Kept dependency-free of `algotrade-order`,
//! `algotrade-broker` and `algotrade-strategy` so all of them can depend on it without a cycle.

pub mod asset;
pub mod broker_id;
pub mod connection;
pub mod ids;
pub mod instrument;
pub mod session;
pub mod side;

pub use asset::{Asset, AssetType};
pub use broker_id::BrokerId;
pub use connection::{BrokerConnectionState, ChannelState};
pub use ids::{AccountId, DealReference, OrderId, StrategyInstanceId};
pub use instrument::{Instrument, InstrumentKind};
pub use session::{Session, SessionState};
pub use side::Side;
