use crate::error::PersistenceError;
use crate::recovery::{RecoveryContext, StrategyStateRecord};
use crate::store::PersistenceStore;
use algotrade_instrument::{AccountId, Instrument, OrderId, Session, StrategyInstanceId};
use algotrade_marketdata::Bar;
use algotrade_order::{Order, OrderState};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct OrderEventRow {
    order_id: OrderId,
    from: OrderState,
    to: OrderState,
    timestamp: DateTime<Utc>,
    payload: serde_json::Value,
}

#[derive(Default)]
struct State {
    sessions: HashMap<(NaiveDate, AccountId), Session>,
    strategy_states: HashMap<StrategyInstanceId, StrategyStateRecord>,
    order_events: Vec<OrderEventRow>,
    orders: HashMap<(AccountId, NaiveDate), HashMap<OrderId, Order>>,
    bars: HashMap<(AccountId, NaiveDate), Vec<(Instrument, Bar)>>,
}

/// Process-local [`PersistenceStore`] for tests and backtests: no I/O, no reconnect behavior,
/// everything durable the instant it's written.
#[derive(Default)]
pub struct InMemoryPersistence {
    state: Mutex<State>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceStore for InMemoryPersistence {
    async fn put_session(&self, session: &Session) -> Result<(), PersistenceError> {
        self.state
            .lock()
            .sessions
            .insert((session.day, session.account.clone()), session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        day: NaiveDate,
        account: &AccountId,
    ) -> Result<Option<Session>, PersistenceError> {
        Ok(self
            .state
            .lock()
            .sessions
            .get(&(day, account.clone()))
            .cloned())
    }

    async fn put_strategy_state(
        &self,
        strategy_id: StrategyInstanceId,
        class_name: &str,
        parameters: &serde_json::Value,
        state_blob: serde_json::Value,
        expected_version: u64,
    ) -> Result<u64, PersistenceError> {
        let mut state = self.state.lock();
        let current_version = state
            .strategy_states
            .get(&strategy_id)
            .map(|record| record.version)
            .unwrap_or(0);

        if current_version != expected_version {
            return Err(PersistenceError::StaleVersion {
                strategy_id: strategy_id.to_string(),
                given: expected_version,
                current: current_version,
            });
        }

        let new_version = current_version + 1;
        state.strategy_states.insert(
            strategy_id,
            StrategyStateRecord {
                strategy_id,
                class_name: class_name.to_string(),
                parameters: parameters.clone(),
                state_blob,
                version: new_version,
            },
        );
        Ok(new_version)
    }

    async fn append_order_event(
        &self,
        order_id: OrderId,
        from: OrderState,
        to: OrderState,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), PersistenceError> {
        self.state.lock().order_events.push(OrderEventRow {
            order_id,
            from,
            to,
            timestamp,
            payload,
        });
        Ok(())
    }

    async fn put_order_snapshot(
        &self,
        account: &AccountId,
        day: NaiveDate,
        order: &Order,
    ) -> Result<(), PersistenceError> {
        self.state
            .lock()
            .orders
            .entry((account.clone(), day))
            .or_default()
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn record_bar(
        &self,
        account: &AccountId,
        day: NaiveDate,
        instrument: &Instrument,
        bar: &Bar,
    ) -> Result<(), PersistenceError> {
        self.state
            .lock()
            .bars
            .entry((account.clone(), day))
            .or_default()
            .push((instrument.clone(), bar.clone()));
        Ok(())
    }

    async fn load_recovery_context(
        &self,
        account: &AccountId,
        day: NaiveDate,
    ) -> Result<Option<RecoveryContext>, PersistenceError> {
        let state = self.state.lock();
        let Some(session) = state.sessions.get(&(day, account.clone())).cloned() else {
            return Ok(None);
        };

        let strategies = session
            .strategies
            .iter()
            .filter_map(|id| state.strategy_states.get(id).cloned())
            .collect();

        let open_orders = state
            .orders
            .get(&(account.clone(), day))
            .map(|orders| {
                orders
                    .values()
                    .filter(|order| !algotrade_integration::Terminal::is_terminal(&order.state))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let bar_log = state
            .bars
            .get(&(account.clone(), day))
            .cloned()
            .unwrap_or_default();

        Ok(Some(RecoveryContext {
            session,
            strategies,
            open_orders,
            bar_log,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrade_instrument::Session;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 7, 27).unwrap()
    }

    #[tokio::test]
    async fn put_then_get_session_round_trips() {
        let store = InMemoryPersistence::new();
        let account = AccountId::from("ACC-1".to_string());
        let session = Session::new_pending(day(), account.clone());
        store.put_session(&session).await.unwrap();

        let loaded = store.get_session(day(), &account).await.unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[tokio::test]
    async fn strategy_state_cas_rejects_stale_version() {
        let store = InMemoryPersistence::new();
        let strategy_id = StrategyInstanceId::random();
        let params = serde_json::json!({});

        let v1 = store
            .put_strategy_state(strategy_id, "SmaCross", &params, serde_json::json!({}), 0)
            .await
            .unwrap();
        assert_eq!(v1, 1);

        let stale = store
            .put_strategy_state(strategy_id, "SmaCross", &params, serde_json::json!({}), 0)
            .await;
        assert!(matches!(
            stale,
            Err(PersistenceError::StaleVersion { given: 0, current: 1, .. })
        ));

        let v2 = store
            .put_strategy_state(strategy_id, "SmaCross", &params, serde_json::json!({}), 1)
            .await
            .unwrap();
        assert_eq!(v2, 2);
    }

    #[tokio::test]
    async fn recovery_context_is_none_without_a_session() {
        let store = InMemoryPersistence::new();
        let account = AccountId::from("ACC-1".to_string());
        assert!(store
            .load_recovery_context(&account, day())
            .await
            .unwrap()
            .is_none());
    }
}
