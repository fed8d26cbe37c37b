use crate::error::PersistenceError;
use crate::recovery::{RecoveryContext, StrategyStateRecord};
use crate::store::PersistenceStore;
use algotrade_instrument::{AccountId, Instrument, OrderId, Session, StrategyInstanceId};
use algotrade_marketdata::Bar;
use algotrade_order::{Order, OrderState};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::time::Duration;

/// Connection-loss handling per §7: three attempts, 3s apart, mirroring the Broker Adapter's own
/// backoff shape for consistency rather than introducing a second retry policy.
const RECONNECT_ATTEMPTS: u32 = 3;
const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// `sqlx`-backed [`PersistenceStore`]. The engine itself has no storage dependency; `sqlx` is
/// carried into this crate from the pack's `proerror77-ploy` example, the closest grounding for
/// a typed async persistence layer.
pub struct SqlitePersistence {
    pool: SqlitePool,
}

impl SqlitePersistence {
    /// Connects with a reconnect loop (§7) and ensures the schema exists. `database_url` is a
    /// plain `sqlx` sqlite URL, e.g. `sqlite://engine.db` or `sqlite::memory:`.
    pub async fn connect(database_url: &str) -> Result<Self, PersistenceError> {
        let pool = Self::connect_with_retry(database_url).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn connect_with_retry(database_url: &str) -> Result<SqlitePool, PersistenceError> {
        let mut last_error = None;
        for attempt in 1..=RECONNECT_ATTEMPTS {
            match SqlitePoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(pool),
                Err(error) => {
                    tracing::warn!(attempt, %error, "persistence connection attempt failed");
                    last_error = Some(error);
                    if attempt < RECONNECT_ATTEMPTS {
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        }
        tracing::error!(attempts = RECONNECT_ATTEMPTS, "exhausted persistence reconnect attempts");
        let _ = last_error;
        Err(PersistenceError::ReconnectExhausted {
            attempts: RECONNECT_ATTEMPTS,
        })
    }

    async fn migrate(&self) -> Result<(), PersistenceError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS sessions (
                day TEXT NOT NULL,
                account TEXT NOT NULL,
                blob TEXT NOT NULL,
                PRIMARY KEY (day, account)
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS strategy_states (
                strategy_id TEXT PRIMARY KEY,
                class_name TEXT NOT NULL,
                parameters TEXT NOT NULL,
                state_blob TEXT NOT NULL,
                version INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS order_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                from_state TEXT NOT NULL,
                to_state TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                payload TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS orders (
                order_id TEXT PRIMARY KEY,
                account TEXT NOT NULL,
                day TEXT NOT NULL,
                blob TEXT NOT NULL,
                is_terminal INTEGER NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS bars (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account TEXT NOT NULL,
                day TEXT NOT NULL,
                blob TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl PersistenceStore for SqlitePersistence {
    async fn put_session(&self, session: &Session) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(session)?;
        sqlx::query("INSERT OR REPLACE INTO sessions (day, account, blob) VALUES (?, ?, ?)")
            .bind(session.day.to_string())
            .bind(session.account.to_string())
            .bind(blob)
            .execute(&self.pool)
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;
        Ok(())
    }

    async fn get_session(
        &self,
        day: NaiveDate,
        account: &AccountId,
    ) -> Result<Option<Session>, PersistenceError> {
        let row = sqlx::query("SELECT blob FROM sessions WHERE day = ? AND account = ?")
            .bind(day.to_string())
            .bind(account.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;

        match row {
            Some(row) => {
                let blob: String = row
                    .try_get("blob")
                    .map_err(|error| PersistenceError::Database(error.to_string()))?;
                Ok(Some(serde_json::from_str(&blob)?))
            }
            None => Ok(None),
        }
    }

    async fn put_strategy_state(
        &self,
        strategy_id: StrategyInstanceId,
        class_name: &str,
        parameters: &serde_json::Value,
        state_blob: serde_json::Value,
        expected_version: u64,
    ) -> Result<u64, PersistenceError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;

        let current_version: i64 = sqlx::query("SELECT version FROM strategy_states WHERE strategy_id = ?")
            .bind(strategy_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?
            .map(|row| row.try_get::<i64, _>("version"))
            .transpose()
            .map_err(|error| PersistenceError::Database(error.to_string()))?
            .unwrap_or(0);

        if current_version as u64 != expected_version {
            return Err(PersistenceError::StaleVersion {
                strategy_id: strategy_id.to_string(),
                given: expected_version,
                current: current_version as u64,
            });
        }

        let new_version = current_version + 1;
        sqlx::query(
            "INSERT OR REPLACE INTO strategy_states
                (strategy_id, class_name, parameters, state_blob, version)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(strategy_id.to_string())
        .bind(class_name)
        .bind(serde_json::to_string(parameters)?)
        .bind(serde_json::to_string(&state_blob)?)
        .bind(new_version)
        .execute(&mut *tx)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        tx.commit()
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;

        Ok(new_version as u64)
    }

    async fn append_order_event(
        &self,
        order_id: OrderId,
        from: OrderState,
        to: OrderState,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<(), PersistenceError> {
        sqlx::query(
            "INSERT INTO order_events (order_id, from_state, to_state, timestamp, payload)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id.to_string())
        .bind(from.to_string())
        .bind(to.to_string())
        .bind(timestamp.to_rfc3339())
        .bind(serde_json::to_string(&payload)?)
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;
        Ok(())
    }

    async fn put_order_snapshot(
        &self,
        account: &AccountId,
        day: NaiveDate,
        order: &Order,
    ) -> Result<(), PersistenceError> {
        use algotrade_integration::Terminal;
        let blob = serde_json::to_string(order)?;
        sqlx::query(
            "INSERT OR REPLACE INTO orders (order_id, account, day, blob, is_terminal)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order.id.to_string())
        .bind(account.to_string())
        .bind(day.to_string())
        .bind(blob)
        .bind(order.state.is_terminal() as i64)
        .execute(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;
        Ok(())
    }

    async fn record_bar(
        &self,
        account: &AccountId,
        day: NaiveDate,
        instrument: &Instrument,
        bar: &Bar,
    ) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(&(instrument, bar))?;
        sqlx::query("INSERT INTO bars (account, day, blob) VALUES (?, ?, ?)")
            .bind(account.to_string())
            .bind(day.to_string())
            .bind(blob)
            .execute(&self.pool)
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;
        Ok(())
    }

    async fn load_recovery_context(
        &self,
        account: &AccountId,
        day: NaiveDate,
    ) -> Result<Option<RecoveryContext>, PersistenceError> {
        let Some(session) = self.get_session(day, account).await? else {
            return Ok(None);
        };

        let mut strategies = Vec::with_capacity(session.strategies.len());
        for strategy_id in &session.strategies {
            let row = sqlx::query(
                "SELECT class_name, parameters, state_blob, version
                 FROM strategy_states WHERE strategy_id = ?",
            )
            .bind(strategy_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;

            if let Some(row) = row {
                let parameters: String = row
                    .try_get("parameters")
                    .map_err(|error| PersistenceError::Database(error.to_string()))?;
                let state_blob: String = row
                    .try_get("state_blob")
                    .map_err(|error| PersistenceError::Database(error.to_string()))?;
                let version: i64 = row
                    .try_get("version")
                    .map_err(|error| PersistenceError::Database(error.to_string()))?;
                strategies.push(StrategyStateRecord {
                    strategy_id: *strategy_id,
                    class_name: row
                        .try_get("class_name")
                        .map_err(|error| PersistenceError::Database(error.to_string()))?,
                    parameters: serde_json::from_str(&parameters)?,
                    state_blob: serde_json::from_str(&state_blob)?,
                    version: version as u64,
                });
            }
        }

        let order_rows = sqlx::query(
            "SELECT blob FROM orders WHERE account = ? AND day = ? AND is_terminal = 0",
        )
        .bind(account.to_string())
        .bind(day.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| PersistenceError::Database(error.to_string()))?;

        let mut open_orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let blob: String = row
                .try_get("blob")
                .map_err(|error| PersistenceError::Database(error.to_string()))?;
            open_orders.push(serde_json::from_str(&blob)?);
        }

        let bar_rows = sqlx::query("SELECT blob FROM bars WHERE account = ? AND day = ? ORDER BY id ASC")
            .bind(account.to_string())
            .bind(day.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| PersistenceError::Database(error.to_string()))?;

        let mut bar_log = Vec::with_capacity(bar_rows.len());
        for row in bar_rows {
            let blob: String = row
                .try_get("blob")
                .map_err(|error| PersistenceError::Database(error.to_string()))?;
            bar_log.push(serde_json::from_str(&blob)?);
        }

        Ok(Some(RecoveryContext {
            session,
            strategies,
            open_orders,
            bar_log,
        }))
    }
}
