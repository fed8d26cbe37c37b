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

//! # Client Channel (§4.7, §6)
//!
//! The in-process request/response and binary-download surface consumed by the external
//! gateway. One [`TcpListener`](tokio::net::TcpListener) accepts connections, each handled on
//! its own task (capped at [`server::DEFAULT_MAX_CONNECTIONS`]); requests are decoded off the
//! wire and posted as [`server::PendingRequest`]s to whoever drives the Trade Manager, which
//! replies through the request's own oneshot channel.
//!
//! This crate only speaks the wire protocol and owns no trading logic: service `2` requests are
//! translated into [`algotrade_core::Command`] values via [`protocol::TradingCommand`], but
//! routing them into a running `TradeManager` and building the response document is left to the
//! binary that wires this channel up.

pub mod error;
pub mod protocol;
pub mod server;

pub use error::ClientChannelError;
pub use protocol::{ClientRequest, ClientResponse, Service, TradingCommand};
pub use server::{ClientChannel, PendingRequest, DEFAULT_MAX_CONNECTIONS};
