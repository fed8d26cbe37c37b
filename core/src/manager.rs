//! The Trade Manager (§4.6): the concrete, single-account engine loop wiring the Broker Adapter,
//! Order Tracker, Market Data Router, Risk review, Strategy Framework and Persistence Store
//! together. Monomorphic by design — the "Engine generic over
//! Clock/State/ExecutionTxs/Strategy/Risk -> concrete, single-account TradeManager" design note
//! replaces the teacher's 5-type-param generic `Engine` with one concrete struct, since this
//! engine drives exactly one account through exactly one broker (§1).

use crate::config::EngineConfig;
use crate::error::TradingError;
use crate::event::{Command, EngineEvent};
use crate::registry::StrategyRegistry;
use algotrade_broker::{BrokerAdapter, BrokerEvent, BrokerEventReceiver, Portfolio};
use algotrade_instrument::{Instrument, OrderId, Session, Side, StrategyInstanceId};
use algotrade_integration::collection::FnvIndexMap;
use algotrade_marketdata::{Bar, MarketDataRouter, RouterEvent};
use algotrade_order::{Order, OrderDraft, OrderState, OrderTracker};
use algotrade_persistence::PersistenceStore;
use algotrade_risk::RiskManager;
use algotrade_strategy::{Action, StrategyHandle, StrategySignal};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

/// §4.6 periodic task cadence.
const PORTFOLIO_REFRESH_INTERVAL: Duration = Duration::from_secs(30);
const ACCOUNT_INFO_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct StrategyInstance {
    handle: StrategyHandle,
    instrument: Instrument,
    validated: bool,
}

/// Drives exactly one [`algotrade_instrument::AccountId`] through exactly one
/// [`BrokerAdapter`] (§1). Owns every other subsystem and is the sole place their events cross.
pub struct TradeManager {
    config: EngineConfig,
    persistence: Arc<dyn PersistenceStore>,
    broker: Box<dyn BrokerAdapter>,
    broker_events: BrokerEventReceiver,
    risk: Box<dyn RiskManager>,
    strategy_registry: StrategyRegistry,
    order_tracker: OrderTracker<Arc<dyn PersistenceStore>>,
    market_data: MarketDataRouter,
    strategies: FnvIndexMap<StrategyInstanceId, StrategyInstance>,
    order_owner: FnvIndexMap<OrderId, StrategyInstanceId>,
    portfolio: Portfolio,
    session: Session,
    trading_enabled: bool,
    last_portfolio_refresh: Option<DateTime<Utc>>,
    last_account_info_refresh: Option<DateTime<Utc>>,
    last_daily_clean: Option<NaiveDate>,
}

impl TradeManager {
    pub fn new(
        config: EngineConfig,
        persistence: Arc<dyn PersistenceStore>,
        broker: Box<dyn BrokerAdapter>,
        broker_events: BrokerEventReceiver,
        risk: Box<dyn RiskManager>,
        strategy_registry: StrategyRegistry,
        now: DateTime<Utc>,
    ) -> Self {
        let trading_enabled = config.trading_enabled;
        let order_tracker = OrderTracker::new(Arc::clone(&persistence));
        let session = Session::new_pending(now.date_naive(), config.account_id.clone());
        Self {
            config,
            persistence,
            broker,
            broker_events,
            risk,
            strategy_registry,
            order_tracker,
            market_data: MarketDataRouter::new(),
            strategies: FnvIndexMap::default(),
            order_owner: FnvIndexMap::default(),
            portfolio: Portfolio::default(),
            session,
            trading_enabled,
            last_portfolio_refresh: None,
            last_account_info_refresh: None,
            last_daily_clean: None,
        }
    }

    /// Performed once at process startup (§4.1 "Recovery on startup"): initializes the broker,
    /// then — if a recovery context exists for today — re-creates every Strategy Instance from
    /// its persisted class/parameters/state, reconciles open orders, and replays the day's bar
    /// log into `resume` before any live bar is delivered.
    pub async fn start(&mut self, now: DateTime<Utc>) -> Result<(), TradingError> {
        let account_info = self.broker.init().await?;
        tracing::info!(account_id = %account_info.account_id, "broker adapter initialized");

        let day = now.date_naive();
        let Some(context) = self
            .persistence
            .load_recovery_context(&self.config.account_id, day)
            .await?
        else {
            tracing::info!(%day, "no recovery context found, starting a fresh session");
            return Ok(());
        };

        tracing::info!(%day, strategies = context.strategies.len(), open_orders = context.open_orders.len(), "recovering session");
        self.session = context.session;

        let mut bars_by_instrument: FnvIndexMap<Instrument, Vec<Bar>> = FnvIndexMap::default();
        for (instrument, bar) in context.bar_log {
            bars_by_instrument.entry(instrument).or_default().push(bar);
        }

        for record in context.strategies {
            let Some(mut handle) = self.strategy_registry.build(
                &record.class_name,
                record.strategy_id,
                record.parameters,
                record.state_blob,
                record.version,
            ) else {
                tracing::error!(class_name = %record.class_name, "no registered factory for recovered strategy class");
                continue;
            };

            let Some(instrument) = self
                .strategies
                .get(&record.strategy_id)
                .map(|instance| instance.instrument.clone())
            else {
                tracing::warn!(strategy_id = %record.strategy_id, "recovered strategy record has no matching registered instance, skipping");
                continue;
            };

            let bars_today = bars_by_instrument.get(&instrument).cloned().unwrap_or_default();
            handle.resume(&bars_today, &self.portfolio, now);
            if let Some(instance) = self.strategies.get_mut(&record.strategy_id) {
                instance.handle = handle;
                instance.validated = true;
            }
        }

        for order in context.open_orders {
            self.order_tracker.create(order.id, draft_of(&order), order.created_at);
        }

        Ok(())
    }

    /// Registers a Strategy Instance under `id`, bound to `instrument`, subscribing it with the
    /// Market Data Router and the Broker Adapter (§4.4, §4.5). `id` is caller-supplied (rather
    /// than generated here) so the same binding can be re-created with a stable identity across
    /// restarts — `start`'s recovery pass matches persisted records against instances already
    /// registered this way, before replacing their handle with the recovered state.
    pub fn open_strategy(
        &mut self,
        id: StrategyInstanceId,
        class_name: &str,
        parameters: serde_json::Value,
        instrument: Instrument,
        broker_timeframe: Duration,
        strategy_timeframe: Duration,
    ) -> Result<(), TradingError> {
        let handle = self
            .strategy_registry
            .build(class_name, id, parameters, serde_json::Value::Null, 0)
            .ok_or_else(|| TradingError::UnknownStrategyClass(class_name.to_string()))?;

        self.market_data
            .subscribe(instrument.clone(), id, broker_timeframe, strategy_timeframe)?;
        self.broker.request_subscribe(instrument.clone(), broker_timeframe);

        self.strategies.insert(
            id,
            StrategyInstance {
                handle,
                instrument,
                validated: false,
            },
        );
        self.session.strategies.push(id);
        Ok(())
    }

    /// One iteration of the engine loop (§4.6):
    /// 1. advance the broker connection state machine,
    /// 2. open the Session and validate/initialize Strategy Instances once trading hours begin,
    /// 3. drain the broker's callback queue,
    /// 4. sweep submit-timeout deadlines,
    /// 5. check market-data staleness,
    /// 6. run the periodic portfolio/account-info/daily-cleanup tasks.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<(), TradingError> {
        self.broker.tick(now).await;
        if !self.broker.connection_state().is_trading_possible() {
            tracing::warn!(state = ?self.broker.connection_state(), "broker channel not connected");
        }

        self.open_session_if_needed(now);
        self.drain_broker_events(now).await?;

        for order_id in self.order_tracker.sweep_submit_timeouts(now).await {
            if let Some(strategy_id) = self.order_owner.get(&order_id).copied() {
                if let (Some(order), Some(instance)) =
                    (self.order_tracker.get(order_id).cloned(), self.strategies.get_mut(&strategy_id))
                {
                    instance.handle.on_order_error(&order);
                }
            }
        }

        for (instrument, event) in self.market_data.check_staleness(now) {
            self.notify_staleness(&instrument, event);
        }

        self.run_periodic_tasks(now).await?;
        Ok(())
    }

    /// Dispatches one externally-submitted [`EngineEvent`]. Returns `true` if it was a shutdown
    /// request.
    pub async fn handle_event(&mut self, event: EngineEvent, now: DateTime<Utc>) -> Result<bool, TradingError> {
        match event {
            EngineEvent::Shutdown(_) => {
                self.shutdown().await;
                Ok(true)
            }
            EngineEvent::Command(command) => {
                self.handle_command(command, now).await?;
                Ok(false)
            }
        }
    }

    async fn shutdown(&mut self) {
        self.broker.shutdown().await;
        self.session.close();
        let _ = self.persistence.put_session(&self.session).await;
    }

    async fn handle_command(&mut self, command: Command, now: DateTime<Utc>) -> Result<(), TradingError> {
        match command {
            Command::SetTradingEnabled(enabled) => {
                self.trading_enabled = enabled;
                tracing::info!(enabled, "trading enable flag updated by operator command");
            }
            Command::CancelOrder { order_id } => self.cancel_order(order_id, now).await?,
            Command::OpenPosition {
                strategy_id,
                instrument,
                side,
                quantity,
                stop_price,
            } => {
                let action = match side {
                    Side::Buy => Action::Buy,
                    Side::Sell => Action::Sell,
                };
                self.create_order(
                    strategy_id,
                    instrument,
                    action,
                    quantity,
                    stop_price,
                    now,
                )
                .await?;
            }
            Command::ClosePosition { strategy_id, instrument } => {
                let quantity = self.current_position_quantity(&instrument);
                if !quantity.is_zero() {
                    self.create_order(strategy_id, instrument, Action::Flat, quantity, None, now)
                        .await?;
                }
            }
            Command::ValidateSignal { strategy_id } => {
                if let Some(instance) = self.strategies.get_mut(&strategy_id) {
                    instance.validated = instance.handle.validate(&self.portfolio);
                }
            }
        }
        Ok(())
    }

    fn open_session_if_needed(&mut self, now: DateTime<Utc>) {
        if self.session.is_open() {
            return;
        }
        self.session.open();
        for instance in self.strategies.values_mut() {
            instance.validated = instance.handle.validate(&self.portfolio);
            if instance.validated {
                instance.handle.initialize(&self.portfolio, true);
            }
        }
        tracing::info!(day = %now.date_naive(), "session opened");
    }

    async fn drain_broker_events(&mut self, now: DateTime<Utc>) -> Result<(), TradingError> {
        while let Ok(event) = self.broker_events.try_recv() {
            self.handle_broker_event(event, now).await?;
        }
        Ok(())
    }

    async fn handle_broker_event(&mut self, event: BrokerEvent, now: DateTime<Utc>) -> Result<(), TradingError> {
        match event {
            BrokerEvent::AccountInfo(info) => {
                tracing::debug!(account_id = %info.account_id, "account info refreshed");
            }
            BrokerEvent::Portfolio(snapshot) => {
                self.portfolio = snapshot.value;
            }
            BrokerEvent::MarketDataSubscribed { instrument, ok, error } => {
                if !ok {
                    tracing::warn!(%instrument, ?error, "market data subscription failed");
                    if let Some(RouterEvent::DataErrorBlocked) =
                        self.market_data.on_resubscribe_failure(&instrument)
                    {
                        self.notify_staleness(&instrument, RouterEvent::DataErrorBlocked);
                    }
                }
            }
            BrokerEvent::MarketData { instrument, bar } => {
                let events = self.market_data.on_broker_bar(&instrument, bar, now);
                for router_event in events {
                    if let RouterEvent::Bar(bar) = router_event {
                        self.on_bar(&instrument, bar, now).await?;
                    }
                }
            }
            BrokerEvent::MarketDataError { instrument } => {
                self.notify_staleness(&instrument, RouterEvent::MarketDataError);
            }
            BrokerEvent::MarketDataRestore { instrument } => {
                self.notify_staleness(&instrument, RouterEvent::MarketDataRestore);
            }
            BrokerEvent::Order { order_id, event, at } => {
                self.order_tracker.on_broker_event(order_id, event, at).await?;
                self.notify_order_observers(order_id, at);
            }
            BrokerEvent::AccountDisconnected { code } => {
                tracing::error!(?code, "broker account disconnected");
            }
        }
        Ok(())
    }

    async fn on_bar(&mut self, instrument: &Instrument, bar: Bar, now: DateTime<Utc>) -> Result<(), TradingError> {
        if bar.closed {
            self.persistence
                .record_bar(&self.config.account_id, now.date_naive(), instrument, &bar)
                .await?;
        }

        let subscribers: Vec<StrategyInstanceId> = self.market_data.subscribers(instrument).to_vec();
        for strategy_id in subscribers {
            let signal = {
                let Some(instance) = self.strategies.get_mut(&strategy_id) else {
                    continue;
                };
                if !instance.validated || !bar.closed {
                    continue;
                }
                instance.handle.process(bar, &self.portfolio)
            };
            self.apply_signal(strategy_id, signal, now).await?;
            self.commit_strategy_state(strategy_id).await?;
        }
        Ok(())
    }

    async fn apply_signal(
        &mut self,
        strategy_id: StrategyInstanceId,
        signal: StrategySignal,
        now: DateTime<Utc>,
    ) -> Result<(), TradingError> {
        if !signal.action.creates_order() {
            return Ok(());
        }
        let Some(instance) = self.strategies.get(&strategy_id) else {
            return Ok(());
        };
        let instrument = instance.instrument.clone();
        self.create_order(strategy_id, instrument, signal.action, signal.quantity, signal.stop_price, now)
            .await
    }

    async fn create_order(
        &mut self,
        strategy_id: StrategyInstanceId,
        instrument: Instrument,
        action: Action,
        quantity: Decimal,
        stop_price: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<(), TradingError> {
        if !self.trading_enabled || !action.creates_order() {
            return Ok(());
        }

        let side = side_for_action(action, &self.portfolio, &instrument);
        let draft = OrderDraft {
            instrument,
            side,
            quantity,
            stop_price,
            limit_price: None,
        };

        match self.risk.check_open(draft) {
            Ok(approved) => {
                let draft = approved.into_item();
                let order_id = OrderId::random();
                self.order_tracker.create(order_id, draft.clone(), now);
                self.order_tracker.submit(order_id, now).await?;
                self.order_owner.insert(order_id, strategy_id);
                self.broker.request_open(order_id, draft);
            }
            Err(refused) => {
                tracing::warn!(%strategy_id, reason = %refused.reason, "order refused by risk review");
            }
        }
        Ok(())
    }

    async fn cancel_order(&mut self, order_id: OrderId, now: DateTime<Utc>) -> Result<(), TradingError> {
        match self.risk.check_cancel(order_id) {
            Ok(approved) => {
                let order_id = approved.into_item();
                self.order_tracker.cancel(order_id, now).await?;
                if let Some(order) = self.order_tracker.get(order_id) {
                    self.broker.request_close(order_id, draft_of(order));
                }
            }
            Err(refused) => {
                tracing::warn!(order_id = %refused.item, reason = %refused.reason, "cancel refused by risk review");
            }
        }
        Ok(())
    }

    async fn commit_strategy_state(&mut self, strategy_id: StrategyInstanceId) -> Result<(), TradingError> {
        let Some(instance) = self.strategies.get_mut(&strategy_id) else {
            return Ok(());
        };
        let Some((state_blob, expected_version)) = instance.handle.commit() else {
            return Ok(());
        };
        self.persistence
            .put_strategy_state(
                strategy_id,
                instance.handle.class_name(),
                instance.handle.parameters(),
                state_blob,
                expected_version - 1,
            )
            .await?;
        Ok(())
    }

    fn notify_order_observers(&mut self, order_id: OrderId, at: DateTime<Utc>) {
        let Some(strategy_id) = self.order_owner.get(&order_id).copied() else {
            return;
        };
        let Some(order) = self.order_tracker.get(order_id).cloned() else {
            return;
        };
        let Some(instance) = self.strategies.get_mut(&strategy_id) else {
            return;
        };
        match order.state {
            OrderState::Accepted => instance.handle.on_order_accepted(&order),
            OrderState::Filled => instance.handle.on_order_filled(&order, at),
            OrderState::Rejected | OrderState::Error => instance.handle.on_order_error(&order),
            _ => {}
        }
    }

    fn notify_staleness(&mut self, instrument: &Instrument, event: RouterEvent) {
        for strategy_id in self.market_data.subscribers(instrument).to_vec() {
            if let Some(instance) = self.strategies.get_mut(&strategy_id) {
                match event {
                    RouterEvent::MarketDataError | RouterEvent::DataErrorBlocked => {
                        instance.handle.on_market_data_error();
                    }
                    RouterEvent::MarketDataRestore => instance.handle.on_market_data_restore(),
                    RouterEvent::Bar(_) => {}
                }
            }
        }
    }

    fn current_position_quantity(&self, instrument: &Instrument) -> Decimal {
        self.portfolio
            .positions
            .get(&instrument.symbol)
            .map(|position| position.quantity)
            .unwrap_or_default()
    }

    async fn run_periodic_tasks(&mut self, now: DateTime<Utc>) -> Result<(), TradingError> {
        if due(self.last_portfolio_refresh, now, PORTFOLIO_REFRESH_INTERVAL) {
            self.broker.request_portfolio();
            self.last_portfolio_refresh = Some(now);
        }
        if due(self.last_account_info_refresh, now, ACCOUNT_INFO_REFRESH_INTERVAL) {
            self.broker.request_account_info();
            self.last_account_info_refresh = Some(now);
        }

        let today = now.date_naive();
        if now.time() >= self.config.daily_clean_time && self.last_daily_clean != Some(today) {
            self.daily_clean(now).await?;
            self.last_daily_clean = Some(today);
        }
        Ok(())
    }

    /// §4.6 "daily cleanup": closes the current Session and persists its final state. A fresh
    /// `Session` is not opened until the next tick during tomorrow's trading hours.
    async fn daily_clean(&mut self, now: DateTime<Utc>) -> Result<(), TradingError> {
        tracing::info!(day = %now.date_naive(), "running daily cleanup");
        self.session.close();
        self.persistence.put_session(&self.session).await?;
        self.session = Session::new_pending(now.date_naive(), self.config.account_id.clone());
        Ok(())
    }
}

fn due(last: Option<DateTime<Utc>>, now: DateTime<Utc>, interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => (now - last).to_std().unwrap_or(Duration::ZERO) >= interval,
    }
}

fn side_for_action(action: Action, portfolio: &Portfolio, instrument: &Instrument) -> Side {
    match action {
        Action::Buy | Action::BuySell | Action::StopPriceReached => Side::Buy,
        Action::Sell => Side::Sell,
        Action::Flat => {
            let position = portfolio
                .positions
                .get(&instrument.symbol)
                .map(|position| position.quantity)
                .unwrap_or_default();
            if position.is_sign_positive() {
                Side::Sell
            } else {
                Side::Buy
            }
        }
        _ => Side::Buy,
    }
}

fn draft_of(order: &Order) -> OrderDraft {
    OrderDraft {
        instrument: order.instrument.clone(),
        side: order.side,
        quantity: order.quantity,
        stop_price: order.stop_price,
        limit_price: order.limit_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algotrade_broker::MockBrokerAdapter;
    use algotrade_instrument::{BrokerId, InstrumentKind};
    use algotrade_persistence::InMemoryPersistence;
    use algotrade_risk::NoRiskManager;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 27, 10, 0, 0).unwrap()
    }

    fn config() -> EngineConfig {
        std::env::set_var("ACCOUNT_ID", "TEST-ACCOUNT");
        EngineConfig::from_env().unwrap()
    }

    fn manager() -> TradeManager {
        let (broker, rx) = MockBrokerAdapter::new();
        TradeManager::new(
            config(),
            Arc::new(InMemoryPersistence::default()),
            Box::new(broker),
            rx,
            Box::new(NoRiskManager),
            StrategyRegistry::new(),
            now(),
        )
    }

    fn instrument() -> Instrument {
        Instrument::new("WINFUT", InstrumentKind::Future, BrokerId::Mock, "WINQ25")
    }

    #[tokio::test]
    async fn start_with_no_recovery_context_leaves_a_pending_session() {
        let mut manager = manager();
        manager.start(now()).await.unwrap();
        assert!(!manager.session.is_open());
    }

    #[tokio::test]
    async fn first_tick_opens_the_session() {
        let mut manager = manager();
        manager.start(now()).await.unwrap();
        manager.tick(now()).await.unwrap();
        assert!(manager.session.is_open());
    }

    #[tokio::test]
    async fn close_position_with_no_open_quantity_is_a_no_op() {
        let mut manager = manager();
        manager.start(now()).await.unwrap();
        manager.tick(now()).await.unwrap();

        let result = manager
            .handle_event(
                EngineEvent::Command(Command::ClosePosition {
                    strategy_id: StrategyInstanceId::random(),
                    instrument: instrument(),
                }),
                now(),
            )
            .await
            .unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn shutdown_event_reports_terminal() {
        let mut manager = manager();
        manager.start(now()).await.unwrap();
        let shutdown = manager.handle_event(EngineEvent::shutdown(), now()).await.unwrap();
        assert!(shutdown);
    }
}
