use crate::adapter::{BrokerAdapter, BrokerEventSender};
use crate::error::BrokerError;
use crate::event::{AccountInfo, BrokerEvent};
use algotrade_instrument::{BrokerConnectionState, ChannelState, Instrument, OrderId};
use algotrade_order::{BrokerOrderEvent, OrderDraft};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;

/// A fully-deterministic in-process adapter implementing the complete §4.2 contract: used by
/// tests and by the golden-cross/death-cross scenarios in §8, where the test drives `push_bar`
/// directly instead of a real feed thread.
pub struct MockBrokerAdapter {
    tx: BrokerEventSender,
    connection: BrokerConnectionState,
    auth_should_fail: bool,
}

impl MockBrokerAdapter {
    /// Returns the adapter plus the receiver half of its event channel, mirroring how a real
    /// adapter's constructor would hand the Trade Manager both halves at registration time.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BrokerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                connection: BrokerConnectionState::default(),
                auth_should_fail: false,
            },
            rx,
        )
    }

    /// Scenario 6 (§8): construct an adapter whose `init` call returns `AUTH`.
    pub fn new_with_auth_failure() -> (Self, mpsc::UnboundedReceiver<BrokerEvent>) {
        let (adapter, rx) = Self::new();
        (
            Self {
                auth_should_fail: true,
                ..adapter
            },
            rx,
        )
    }

    /// Test helper: deliver a broker-native bar as if it arrived over the wire.
    pub fn push_bar(&self, instrument: Instrument, bar: crate::bar::BrokerBar) {
        let _ = self.tx.send(BrokerEvent::MarketData { instrument, bar });
    }

    /// Test helper: simulate an immediate fill for an order just opened.
    pub fn push_fill(&self, order_id: OrderId, event: BrokerOrderEvent, at: DateTime<Utc>) {
        let _ = self.tx.send(BrokerEvent::Order {
            order_id,
            event,
            at,
        });
    }
}

#[async_trait]
impl BrokerAdapter for MockBrokerAdapter {
    async fn init(&mut self) -> Result<AccountInfo, BrokerError> {
        if self.auth_should_fail {
            return Err(BrokerError::Auth);
        }
        self.connection.api_conn = ChannelState::Connected;
        self.connection.feed_conn = ChannelState::Connected;
        Ok(AccountInfo {
            account_id: "MOCK-ACCOUNT".to_string(),
            supported_history_timeframes: vec![Duration::from_secs(60)],
            supported_data_timeframes: vec![Duration::from_secs(60)],
        })
    }

    async fn tick(&mut self, _now: DateTime<Utc>) {}

    fn connection_state(&self) -> BrokerConnectionState {
        self.connection
    }

    fn request_account_info(&self) {
        let _ = self.tx.send(BrokerEvent::AccountInfo(AccountInfo {
            account_id: "MOCK-ACCOUNT".to_string(),
            supported_history_timeframes: vec![],
            supported_data_timeframes: vec![],
        }));
    }

    fn request_portfolio(&self) {
        let _ = self.tx.send(BrokerEvent::Portfolio(
            algotrade_integration::snapshot::Snapshot::new(Utc::now(), crate::event::Portfolio::default()),
        ));
    }

    fn request_subscribe(&self, instrument: Instrument, _timeframe: Duration) {
        let _ = self.tx.send(BrokerEvent::MarketDataSubscribed {
            instrument,
            ok: true,
            error: None,
        });
    }

    fn request_unsubscribe(&self, _instrument: Instrument) {}

    fn request_open(&self, order_id: OrderId, _draft: OrderDraft) {
        let _ = self.tx.send(BrokerEvent::Order {
            order_id,
            event: BrokerOrderEvent::Accepted {
                deal_reference: algotrade_instrument::DealReference(format!("MOCK-{order_id}")),
            },
            at: Utc::now(),
        });
    }

    fn request_close(&self, order_id: OrderId, draft: OrderDraft) {
        self.request_open(order_id, draft);
    }

    fn request_stop(&self, order_id: OrderId, draft: OrderDraft) {
        self.request_open(order_id, draft);
    }

    async fn shutdown(&mut self) {
        self.connection.api_conn = ChannelState::Disconnected;
        self.connection.feed_conn = ChannelState::Disconnected;
    }
}
