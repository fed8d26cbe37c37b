use crate::error::SocketError;
use tokio::sync::mpsc;

/// Abstraction over a channel sender so callback queues and command queues can be generic over
/// bounded vs. unbounded `tokio::sync::mpsc` without leaking the distinction into call sites.
pub trait Tx<Item>: Clone + Send {
    fn send(&self, item: Item) -> Result<(), SocketError>;
}

impl<Item> Tx<Item> for mpsc::UnboundedSender<Item> {
    fn send(&self, item: Item) -> Result<(), SocketError> {
        self.send(item)
            .map_err(|_| SocketError::Sink("unbounded channel receiver dropped".to_string()))
    }
}

impl<Item> Tx<Item> for mpsc::Sender<Item> {
    fn send(&self, item: Item) -> Result<(), SocketError> {
        self.try_send(item).map_err(|error| match error {
            mpsc::error::TrySendError::Full(_) => {
                SocketError::Sink("bounded channel is full".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                SocketError::Sink("bounded channel receiver dropped".to_string())
            }
        })
    }
}

/// Wraps a [`Tx`] so a send failure is observed once (logged) rather than silently dropped or
/// propagated up through every caller — the request/callback queues in the concurrency model are
/// not expected to fail in normal operation, so a failure here is itself noteworthy.
#[derive(Debug, Clone)]
pub struct ChannelTxDroppable<T> {
    tx: T,
}

impl<T> ChannelTxDroppable<T> {
    pub fn new(tx: T) -> Self {
        Self { tx }
    }
}

impl<T, Item> ChannelTxDroppable<T>
where
    T: Tx<Item>,
{
    pub fn send(&self, item: Item) {
        if let Err(error) = self.tx.send(item) {
            tracing::warn!(%error, "dropping message, channel send failed");
        }
    }
}
