use crate::error::PersistenceError;
use crate::recovery::RecoveryContext;
use algotrade_instrument::{AccountId, Instrument, OrderId, Session, StrategyInstanceId};
use algotrade_marketdata::Bar;
use algotrade_order::{Order, OrderState};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Durable storage contract for the engine (§4.1). Deliberately narrow — only the operations
/// the Trade Manager and Order Tracker actually call, grounded on the pack's `EngineStore`
/// dependency-injection trait (one async method per call site, a blanket impl over the concrete
/// store, a mock/in-memory impl for tests).
#[async_trait]
pub trait PersistenceStore: Send + Sync {
    /// Atomic replace of the Session record for its (day, account).
    async fn put_session(&self, session: &Session) -> Result<(), PersistenceError>;

    async fn get_session(
        &self,
        day: NaiveDate,
        account: &AccountId,
    ) -> Result<Option<Session>, PersistenceError>;

    /// CAS on `expected_version`: fails with [`PersistenceError::StaleVersion`] if the on-disk
    /// version has moved since the caller last read it. Returns the new version on success.
    async fn put_strategy_state(
        &self,
        strategy_id: StrategyInstanceId,
        class_name: &str,
        parameters: &serde_json::Value,
        state_blob: serde_json::Value,
        expected_version: u64,
    ) -> Result<u64, PersistenceError>;

    /// Append-only order transition log; must be durable before the caller considers the
    /// transition committed (§4.3).
    async fn append_order_event(
        &self,
        order_id: OrderId,
        from: OrderState,
        to: OrderState,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), PersistenceError>;

    /// Upserts a full order snapshot, used to reconstruct the "open order set" at recovery
    /// without replaying the entire event log.
    async fn put_order_snapshot(
        &self,
        account: &AccountId,
        day: NaiveDate,
        order: &Order,
    ) -> Result<(), PersistenceError>;

    /// Appends one aggregated bar to the day's ordered bar log for `instrument`.
    async fn record_bar(
        &self,
        account: &AccountId,
        day: NaiveDate,
        instrument: &Instrument,
        bar: &Bar,
    ) -> Result<(), PersistenceError>;

    async fn load_recovery_context(
        &self,
        account: &AccountId,
        day: NaiveDate,
    ) -> Result<Option<RecoveryContext>, PersistenceError>;
}

#[async_trait]
impl<T: PersistenceStore + ?Sized> PersistenceStore for std::sync::Arc<T> {
    async fn put_session(&self, session: &Session) -> Result<(), PersistenceError> {
        (**self).put_session(session).await
    }

    async fn get_session(
        &self,
        day: NaiveDate,
        account: &AccountId,
    ) -> Result<Option<Session>, PersistenceError> {
        (**self).get_session(day, account).await
    }

    async fn put_strategy_state(
        &self,
        strategy_id: StrategyInstanceId,
        class_name: &str,
        parameters: &serde_json::Value,
        state_blob: serde_json::Value,
        expected_version: u64,
    ) -> Result<u64, PersistenceError> {
        (**self)
            .put_strategy_state(strategy_id, class_name, parameters, state_blob, expected_version)
            .await
    }

    async fn append_order_event(
        &self,
        order_id: OrderId,
        from: OrderState,
        to: OrderState,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), PersistenceError> {
        (**self).append_order_event(order_id, from, to, timestamp, payload).await
    }

    async fn put_order_snapshot(
        &self,
        account: &AccountId,
        day: NaiveDate,
        order: &Order,
    ) -> Result<(), PersistenceError> {
        (**self).put_order_snapshot(account, day, order).await
    }

    async fn record_bar(
        &self,
        account: &AccountId,
        day: NaiveDate,
        instrument: &Instrument,
        bar: &Bar,
    ) -> Result<(), PersistenceError> {
        (**self).record_bar(account, day, instrument, bar).await
    }

    async fn load_recovery_context(
        &self,
        account: &AccountId,
        day: NaiveDate,
    ) -> Result<Option<RecoveryContext>, PersistenceError> {
        (**self).load_recovery_context(account, day).await
    }
}

/// Every [`PersistenceStore`] doubles as an [`algotrade_order::OrderEventSink`] so an
/// `OrderTracker` can be constructed directly over it, keeping `order` free of a dependency on
/// this crate (§4.3's dependency-inversion boundary).
#[async_trait]
impl<T: PersistenceStore> algotrade_order::OrderEventSink for T {
    async fn append_order_event(
        &self,
        order_id: OrderId,
        from: OrderState,
        to: OrderState,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), String> {
        PersistenceStore::append_order_event(self, order_id, from, to, timestamp, payload)
            .await
            .map_err(|error| error.to_string())
    }
}
