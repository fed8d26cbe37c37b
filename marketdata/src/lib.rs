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

//! Market Data Router (§4.4): the (instrument -> subscribers) registry, the [`BarAggregator`]
//! that promotes broker-native bars into strategy-native ones, and staleness/gap detection with
//! resubscription backoff.

pub mod aggregator;
pub mod bar;
pub mod error;
pub mod router;
pub mod staleness;

pub use aggregator::{AggregatorError, BarAggregator};
pub use bar::Bar;
pub use error::MarketDataError;
pub use router::{MarketDataRouter, RouterEvent};
pub use staleness::{StalenessEvent, StalenessTracker, MAX_RESUBSCRIBE_ATTEMPTS};
