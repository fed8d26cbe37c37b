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

//! Order Tracker (§4.3): the per-order state machine, its legal transition table, and the
//! timeout/cancel-reconciliation behavior around it.

pub mod error;
pub mod model;
pub mod sink;
pub mod state;
pub mod tracker;

pub use error::OrderError;
pub use model::{Fill, Order, OrderDraft, WireOrderState};
pub use sink::{NullEventSink, OrderEventSink};
pub use state::{OrderEvent, OrderState};
pub use tracker::{BrokerOrderEvent, OrderTracker, DEFAULT_SUBMIT_TIMEOUT};
