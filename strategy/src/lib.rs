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

//! Strategy Framework (§4.5): the `Strategy` plugin contract, its object-safe/JSON-erased
//! counterpart for heterogeneous instance registries, and `StrategyHandle`, which brackets every
//! callback with the dirty-check/snapshot and panic-safety rules of the "Safety" paragraph.

pub mod action;
pub mod error;
mod erased;
mod handle;
mod strategy;

pub use action::{Action, StrategySignal};
pub use error::StrategyError;
pub use handle::StrategyHandle;
pub use strategy::Strategy;
