//! # Shutdown Management
//!
//! Traits and types for managing graceful shutdown of trading system components. Supports both
//! synchronous and asynchronous shutdown patterns.
//!
//! ```rust,ignore
//! use algotrade_core::shutdown::SyncShutdown;
//!
//! struct SimpleComponent;
//!
//! impl SyncShutdown for SimpleComponent {
//!     type Result = ();
//!
//!     fn shutdown(&mut self) -> Self::Result {
//!         println!("component shut down");
//!     }
//! }
//! ```
//!
//! ```rust,ignore
//! use algotrade_core::shutdown::AsyncShutdown;
//!
//! struct AsyncComponent;
//!
//! impl AsyncShutdown for AsyncComponent {
//!     type Result = Result<(), String>;
//!
//!     fn shutdown(&mut self) -> impl Future<Output = Self::Result> {
//!         async move {
//!             tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//!             Ok(())
//!         }
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::future::Future;

/// Components that can shut down immediately without async operations.
pub trait SyncShutdown {
    type Result;
    fn shutdown(&mut self) -> Self::Result;
}

/// Components that need to perform async operations during shutdown (flushing buffers, closing
/// network connections, waiting for pending orders to resolve).
pub trait AsyncShutdown {
    type Result;
    fn shutdown(&mut self) -> impl Future<Output = Self::Result>;
}

/// A shutdown signal carried through [`crate::event::EngineEvent`] to trigger a graceful
/// shutdown of the Trade Manager and every component it owns.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Deserialize, Serialize,
)]
pub struct Shutdown;
