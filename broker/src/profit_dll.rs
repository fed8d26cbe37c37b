//! Concrete adapter for Nelógica's ProfitDLL (B3 cash and futures). The wire protocol itself is
//! out of scope for this specification (§1) — only the contract surface matters here, so the
//! actual login/subscribe/send-order calls are delegated to a [`ProfitDllTransport`]
//! implementation supplied by the caller (backed, in production, by the platform-specific FFI
//! crate that talks to the DLL).

use crate::adapter::{BrokerAdapter, BrokerEventSender};
use crate::connection::{ConnectionDriver, ConnectionTick, DisconnectCode as DriverDisconnectCode};
use crate::error::BrokerError;
use crate::event::{AccountInfo, BrokerEvent, DisconnectCode};
use algotrade_instrument::{BrokerConnectionState, Instrument, OrderId};
use algotrade_order::OrderDraft;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Constructor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Credentials and connection parameters, mapping 1:1 onto the `ACCOUNT_ID`/`WS_BASEURL`/
/// `WS_SSL_VERIFY` configuration variables in §6.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Constructor)]
pub struct ProfitDllConfig {
    pub account_id: String,
    pub login: String,
    pub password: String,
    pub base_url: String,
    pub ssl_verify: bool,
}

/// The boundary this specification does not reach past: one async call per §4.2 operation. A
/// production implementation of this trait speaks ProfitDLL's actual wire/FFI protocol.
#[async_trait]
pub trait ProfitDllTransport: Send + Sync {
    async fn login(&self, config: &ProfitDllConfig) -> Result<AccountInfo, BrokerError>;
    async fn poll(&self) -> Vec<BrokerEvent>;
    async fn subscribe(&self, instrument: &Instrument, timeframe: Duration) -> Result<(), BrokerError>;
    async fn unsubscribe(&self, instrument: &Instrument);
    async fn send_order(&self, order_id: OrderId, draft: &OrderDraft) -> Result<(), BrokerError>;
    async fn close(&self);
}

pub struct ProfitDllAdapter {
    config: ProfitDllConfig,
    transport: Arc<dyn ProfitDllTransport>,
    tx: BrokerEventSender,
    api: ConnectionDriver,
    feed: ConnectionDriver,
}

impl ProfitDllAdapter {
    pub fn new(
        config: ProfitDllConfig,
        transport: Arc<dyn ProfitDllTransport>,
        tx: BrokerEventSender,
    ) -> Self {
        Self {
            config,
            transport,
            tx,
            api: ConnectionDriver::default(),
            feed: ConnectionDriver::default(),
        }
    }

    fn emit_disconnect(&self, code: DriverDisconnectCode) {
        let code = match code {
            DriverDisconnectCode::RetryCapExhausted => DisconnectCode::RetryCapExhausted,
            DriverDisconnectCode::TransientLoss => DisconnectCode::TransientLoss,
        };
        let _ = self.tx.send(BrokerEvent::AccountDisconnected { code });
    }
}

#[async_trait]
impl BrokerAdapter for ProfitDllAdapter {
    async fn init(&mut self) -> Result<AccountInfo, BrokerError> {
        self.api.start_connecting();
        self.feed.start_connecting();
        match self.transport.login(&self.config).await {
            Ok(info) => {
                self.api.on_connected();
                self.feed.on_connected();
                Ok(info)
            }
            Err(error) => {
                self.api.on_failure(Utc::now());
                self.feed.on_failure(Utc::now());
                Err(error)
            }
        }
    }

    async fn tick(&mut self, now: DateTime<Utc>) {
        if matches!(self.api.tick(now), ConnectionTick::ShouldConnect) {
            self.api.start_connecting();
            match self.transport.login(&self.config).await {
                Ok(_) => self.api.on_connected(),
                Err(_) => {
                    if let ConnectionTick::Disconnected { code } = self.api.on_failure(now) {
                        self.emit_disconnect(code);
                    }
                }
            }
        }

        for event in self.transport.poll().await {
            let _ = self.tx.send(event);
        }
    }

    fn connection_state(&self) -> BrokerConnectionState {
        BrokerConnectionState {
            api_conn: self.api.state(),
            feed_conn: self.feed.state(),
        }
    }

    fn request_account_info(&self) {
        // ProfitDLL's account callback is push-based: a concrete transport re-emits the latest
        // `BrokerEvent::AccountInfo` from its next `poll()` rather than round-tripping here.
    }

    fn request_portfolio(&self) {
        // Same reasoning as `request_account_info`: portfolio refresh rides `tick`'s
        // `transport.poll()` drain rather than a dedicated round-trip.
    }

    fn request_subscribe(&self, instrument: Instrument, timeframe: Duration) {
        let transport = self.transport.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = transport.subscribe(&instrument, timeframe).await;
            let _ = tx.send(BrokerEvent::MarketDataSubscribed {
                instrument,
                ok: result.is_ok(),
                error: result.err(),
            });
        });
    }

    fn request_unsubscribe(&self, instrument: Instrument) {
        let transport = self.transport.clone();
        tokio::spawn(async move { transport.unsubscribe(&instrument).await });
    }

    fn request_open(&self, order_id: OrderId, draft: OrderDraft) {
        let transport = self.transport.clone();
        tokio::spawn(async move {
            let _ = transport.send_order(order_id, &draft).await;
        });
    }

    fn request_close(&self, order_id: OrderId, draft: OrderDraft) {
        self.request_open(order_id, draft);
    }

    fn request_stop(&self, order_id: OrderId, draft: OrderDraft) {
        self.request_open(order_id, draft);
    }

    async fn shutdown(&mut self) {
        self.transport.close().await;
    }
}
