use crate::error::BrokerError;
use crate::event::{AccountInfo, BrokerEvent};
use algotrade_instrument::{BrokerConnectionState, Instrument, OrderId};
use algotrade_order::OrderDraft;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;

/// The abstract contract every concrete broker plugin implements (§4.2). Every `request_*`
/// method returns as soon as the request is enqueued; results arrive later through the
/// [`BrokerEvent`] channel handed back by [`BrokerAdapter::events`].
///
/// Implementors own their own worker thread(s) for network I/O (§5 "Adapter domain") — nothing
/// here blocks the Trade Manager's cooperative loop.
#[async_trait]
pub trait BrokerAdapter: Send + Sync {
    /// Performed once before the adapter is driven by `tick`.
    async fn init(&mut self) -> Result<AccountInfo, BrokerError>;

    /// Called on every Trade Manager iteration: advances the connection state machine, drains
    /// network I/O, and pushes any resulting events onto the callback queue.
    async fn tick(&mut self, now: DateTime<Utc>);

    fn connection_state(&self) -> BrokerConnectionState;

    fn request_account_info(&self);
    fn request_portfolio(&self);

    /// Idempotent: a second `request_subscribe` for an already-subscribed instrument acks `OK`
    /// without creating a second broker-side subscription (§8 "Adapter idempotence").
    fn request_subscribe(&self, instrument: Instrument, timeframe: Duration);
    fn request_unsubscribe(&self, instrument: Instrument);

    fn request_open(&self, order_id: OrderId, draft: OrderDraft);
    fn request_close(&self, order_id: OrderId, draft: OrderDraft);
    fn request_stop(&self, order_id: OrderId, draft: OrderDraft);

    /// Graceful close of both the API and feed channels (§4.2, §5 shutdown).
    async fn shutdown(&mut self);
}

/// Handle returned alongside a [`BrokerAdapter`]: the Trade Manager drains this queue once per
/// loop iteration (§5 "a single typed event channel drained once per loop tick").
pub type BrokerEventReceiver = mpsc::UnboundedReceiver<BrokerEvent>;
pub type BrokerEventSender = mpsc::UnboundedSender<BrokerEvent>;
