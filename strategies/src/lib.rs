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

//! Concrete [`algotrade_strategy::Strategy`] plugins shipped alongside the framework.

mod sma_cross;

pub use sma_cross::{SmaCrossState, SmaCrossStrategy};
