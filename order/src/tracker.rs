use crate::{
    error::OrderError,
    model::{Fill, Order, OrderDraft},
    sink::OrderEventSink,
    state::{self, OrderEvent, OrderState},
};
use algotrade_instrument::{DealReference, OrderId};
use algotrade_integration::collection::FnvIndexMap;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::time::Duration;

/// Default window (§4.3) after which an unresolved `SUBMITTING` order is forced to `ERROR`.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns every [`Order`] for the current Session and enforces the legal-transition table of
/// §4.3. Runs entirely inside the Trade Manager domain (§5) — no I/O, no locking.
pub struct OrderTracker<S> {
    orders: FnvIndexMap<OrderId, Order>,
    submit_deadlines: FnvIndexMap<OrderId, DateTime<Utc>>,
    submit_timeout: Duration,
    sink: S,
}

impl<S: OrderEventSink> OrderTracker<S> {
    pub fn new(sink: S) -> Self {
        Self::with_submit_timeout(sink, DEFAULT_SUBMIT_TIMEOUT)
    }

    pub fn with_submit_timeout(sink: S, submit_timeout: Duration) -> Self {
        Self {
            orders: FnvIndexMap::default(),
            submit_deadlines: FnvIndexMap::default(),
            submit_timeout,
            sink,
        }
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values().filter(|order| !is_terminal(order))
    }

    /// `create(order_draft) -> order_id` (§4.3). The order starts life in `DRAFT` and is not
    /// persisted until its first transition — `DRAFT` itself is not a durable state.
    pub fn create(&mut self, id: OrderId, draft: OrderDraft, now: DateTime<Utc>) -> OrderId {
        let order = Order::draft(id, draft, now);
        self.orders.insert(id, order);
        id
    }

    /// `submit(order_id)` (§4.3): `DRAFT -> SUBMITTING`, persisted before the caller observes
    /// the new state, and arms the submit-timeout deadline.
    pub async fn submit(&mut self, id: OrderId, now: DateTime<Utc>) -> Result<(), OrderError> {
        self.transition(id, &OrderEvent::Submit, now, serde_json::Value::Null)
            .await?;
        self.submit_deadlines.insert(id, now + self.submit_timeout);
        Ok(())
    }

    /// `cancel(order_id)` (§4.3): requests cancellation from `SUBMITTED`/`PARTIAL`.
    pub async fn cancel(&mut self, id: OrderId, now: DateTime<Utc>) -> Result<(), OrderError> {
        self.transition(id, &OrderEvent::CancelRequest, now, serde_json::Value::Null)
            .await
    }

    /// Drives a broker-originated transition. `deal_reference` is recorded on first accept.
    pub async fn on_broker_event(
        &mut self,
        id: OrderId,
        event: BrokerOrderEvent,
        now: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        match event {
            BrokerOrderEvent::Accepted { deal_reference } => {
                self.transition(
                    id,
                    &OrderEvent::BrokerAccept,
                    now,
                    serde_json::json!({ "deal_reference": deal_reference.0 }),
                )
                .await?;
                if let Some(order) = self.orders.get_mut(&id) {
                    order.deal_reference = Some(deal_reference);
                }
                self.submit_deadlines.shift_remove(&id);
                Ok(())
            }
            BrokerOrderEvent::Rejected { reason } => {
                self.submit_deadlines.shift_remove(&id);
                self.transition(
                    id,
                    &OrderEvent::BrokerReject,
                    now,
                    serde_json::json!({ "reason": reason }),
                )
                .await
            }
            BrokerOrderEvent::Fill { quantity, price } => {
                let order = self
                    .orders
                    .get(&id)
                    .ok_or(OrderError::UnknownOrder(id))?
                    .clone();
                let filled_after = order.filled_quantity() + quantity;
                let event = if filled_after >= order.quantity {
                    fill_event_for_state(order.state)
                } else {
                    OrderEvent::PartialFill
                };
                self.transition(
                    id,
                    &event,
                    now,
                    serde_json::json!({ "quantity": quantity, "price": price }),
                )
                .await?;
                if let Some(order) = self.orders.get_mut(&id) {
                    order.fills.push(Fill {
                        quantity,
                        price,
                        time: now,
                    });
                }
                Ok(())
            }
            BrokerOrderEvent::CancelAck => {
                self.transition(id, &OrderEvent::CancelAck, now, serde_json::Value::Null)
                    .await
            }
            BrokerOrderEvent::FatalError { reason } => {
                self.submit_deadlines.shift_remove(&id);
                self.transition(
                    id,
                    &OrderEvent::FatalBrokerError,
                    now,
                    serde_json::json!({ "reason": reason }),
                )
                .await
            }
        }
    }

    /// Called once per Trade Manager iteration: any `SUBMITTING` order past its deadline is
    /// force-transitioned to `ERROR` and a best-effort cancel is attempted (§4.3).
    pub async fn sweep_submit_timeouts(&mut self, now: DateTime<Utc>) -> Vec<OrderId> {
        let expired: Vec<OrderId> = self
            .submit_deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let mut timed_out = Vec::new();
        for id in expired {
            self.submit_deadlines.shift_remove(&id);
            if self
                .transition(id, &OrderEvent::SubmitTimeout, now, serde_json::Value::Null)
                .await
                .is_ok()
            {
                timed_out.push(id);
            }
        }
        timed_out
    }

    async fn transition(
        &mut self,
        id: OrderId,
        event: &OrderEvent,
        now: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), OrderError> {
        let order = self.orders.get(&id).ok_or(OrderError::UnknownOrder(id))?;
        let from = order.state;
        let to = state::apply(from, event).ok_or(OrderError::IllegalTransition { order: id, from })?;

        self.sink
            .append_order_event(id, from, to, now, payload)
            .await
            .map_err(|error| OrderError::PersistenceFailed(id, error))?;

        let order = self.orders.get_mut(&id).expect("checked above");
        order.state = to;
        order.last_modified_at = now;
        tracing::debug!(%id, %from, %to, "order transition");
        Ok(())
    }
}

fn fill_event_for_state(state: OrderState) -> OrderEvent {
    if state == OrderState::Cancelling {
        OrderEvent::LateFill
    } else {
        OrderEvent::FullFill
    }
}

fn is_terminal(order: &Order) -> bool {
    use algotrade_integration::Terminal;
    order.state.is_terminal()
}

/// Normalized broker-originated events the Order Tracker consumes (collapsed from the adapter's
/// `on_order_accepted`/`on_order_rejected`/`on_order_filled`/`on_order_error` callbacks, §4.2).
#[derive(Debug, Clone, PartialEq)]
pub enum BrokerOrderEvent {
    Accepted { deal_reference: DealReference },
    Rejected { reason: String },
    Fill { quantity: Decimal, price: Decimal },
    CancelAck,
    FatalError { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullEventSink;
    use algotrade_instrument::{BrokerId, Instrument, InstrumentKind, Side};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn draft() -> OrderDraft {
        OrderDraft {
            instrument: Instrument::new("WINFUT", InstrumentKind::Future, BrokerId::Mock, "WINQ25"),
            side: Side::Buy,
            quantity: dec!(100),
            stop_price: None,
            limit_price: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn full_lifecycle_to_filled_is_legal() {
        let mut tracker = OrderTracker::new(NullEventSink);
        let id = OrderId::random();
        tracker.create(id, draft(), now());
        tracker.submit(id, now()).await.unwrap();
        tracker
            .on_broker_event(
                id,
                BrokerOrderEvent::Accepted {
                    deal_reference: DealReference("DEAL-1".into()),
                },
                now(),
            )
            .await
            .unwrap();
        tracker
            .on_broker_event(
                id,
                BrokerOrderEvent::Fill {
                    quantity: dec!(100),
                    price: dec!(14.0),
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(tracker.get(id).unwrap().state, OrderState::Filled);
    }

    #[tokio::test]
    async fn submit_timeout_forces_error() {
        let mut tracker =
            OrderTracker::with_submit_timeout(NullEventSink, Duration::from_secs(1));
        let id = OrderId::random();
        tracker.create(id, draft(), now());
        tracker.submit(id, now()).await.unwrap();

        let later = now() + chrono::Duration::seconds(2);
        let timed_out = tracker.sweep_submit_timeouts(later).await;

        assert_eq!(timed_out, vec![id]);
        assert_eq!(tracker.get(id).unwrap().state, OrderState::Error);
    }

    #[tokio::test]
    async fn partial_then_full_fill() {
        let mut tracker = OrderTracker::new(NullEventSink);
        let id = OrderId::random();
        tracker.create(id, draft(), now());
        tracker.submit(id, now()).await.unwrap();
        tracker
            .on_broker_event(
                id,
                BrokerOrderEvent::Accepted {
                    deal_reference: DealReference("DEAL-2".into()),
                },
                now(),
            )
            .await
            .unwrap();
        tracker
            .on_broker_event(
                id,
                BrokerOrderEvent::Fill {
                    quantity: dec!(40),
                    price: dec!(14.0),
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(tracker.get(id).unwrap().state, OrderState::Partial);

        tracker
            .on_broker_event(
                id,
                BrokerOrderEvent::Fill {
                    quantity: dec!(60),
                    price: dec!(14.1),
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(tracker.get(id).unwrap().state, OrderState::Filled);
    }
}
