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

//! Low-level primitives shared by every crate in the engine: a generic [`channel::Tx`]
//! abstraction over bounded/unbounded `tokio::mpsc` senders, FNV-keyed collections for hot-path
//! registries, a [`snapshot::Snapshot`] wrapper for point-in-time caches, and the
//! [`Terminal`]/[`Unrecoverable`] marker traits the connection state machines key off of.

pub mod channel;
pub mod collection;
pub mod error;
pub mod snapshot;
pub mod stream;

/// Determines if something is considered "unrecoverable" from inside its own domain — e.g. an
/// `AUTH` broker error, which is fatal for the session and must not be retried.
pub trait Unrecoverable {
    fn is_unrecoverable(&self) -> bool;
}

/// Communicates that a value represents a terminal state (eg/ a terminal `Order` state, a
/// `FAILED` connection state) that will not transition further without external intervention.
pub trait Terminal {
    fn is_terminal(&self) -> bool;
}

/// [`Validator`]s are capable of determining if their internal state is satisfactory to fulfil
/// some use case defined by the implementor — used by config and wire-decoded types at the
/// boundary where they enter the system.
pub trait Validator {
    fn validate(self) -> Result<Self, error::SocketError>
    where
        Self: Sized;
}
