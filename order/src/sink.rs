use crate::state::OrderState;
use algotrade_instrument::OrderId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable append-only log of order-state transitions (§4.1 `append_order_event`). The Order
/// Tracker depends only on this trait, not on the concrete persistence crate, so the
/// dependency graph stays a DAG (persistence depends on order, not the reverse).
#[async_trait]
pub trait OrderEventSink: Send + Sync {
    async fn append_order_event(
        &self,
        order_id: OrderId,
        from: OrderState,
        to: OrderState,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), String>;
}

/// No-op sink for tests that don't exercise recovery/persistence behavior.
#[derive(Debug, Default)]
pub struct NullEventSink;

#[async_trait]
impl OrderEventSink for NullEventSink {
    async fn append_order_event(
        &self,
        _order_id: OrderId,
        _from: OrderState,
        _to: OrderState,
        _timestamp: DateTime<Utc>,
        _payload: serde_json::Value,
    ) -> Result<(), String> {
        Ok(())
    }
}
