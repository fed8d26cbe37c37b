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

//! Persistence Store (§4.1): the durable record of Sessions, Strategy Instance state (CAS'd by
//! version), the order-event append log, and the recovery context the engine replays at startup.

pub mod error;
pub mod in_memory;
pub mod recovery;
pub mod sqlite;
pub mod store;

pub use error::PersistenceError;
pub use in_memory::InMemoryPersistence;
pub use recovery::{RecoveryContext, StrategyStateRecord};
pub use sqlite::SqlitePersistence;
pub use store::PersistenceStore;
