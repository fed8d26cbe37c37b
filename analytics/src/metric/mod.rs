//! Performance metrics, each computed from already-aggregated statistics over a set of closed
//! trades rather than from a raw return series.

pub mod profit_factor;
pub mod sharpe;
pub mod win_rate;
