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

//! Performance metrics (Sharpe, win rate, profit factor) and a [`summary::TradingSummaryGenerator`]
//! that accumulates closed trades into a per-instrument report.
//!
//! ```rust
//! use algotrade_analytics::metric::sharpe::SharpeRatio;
//! use algotrade_analytics::time::Daily;
//! use rust_decimal_macros::dec;
//!
//! let risk_free = dec!(0.0015);
//! let mean_ret = dec!(0.0025);
//! let std_dev = dec!(0.0200);
//!
//! let sharpe = SharpeRatio::calculate(risk_free, mean_ret, std_dev, Daily);
//! assert_eq!(sharpe.value, dec!(0.05));
//! ```

pub mod metric;
pub mod summary;
pub mod time;

pub use summary::{ClosedTrade, TradingSummary, TradingSummaryGenerator};
