//! Reference engine binary: loads configuration from the environment, wires up a SQLite
//! persistence backend, the deterministic Mock broker adapter, one registered strategy class,
//! and the Client Channel, then runs the engine loop until `SIGINT`.
//!
//! A real deployment swaps the broker registration below for
//! [`algotrade_broker::profit_dll::ProfitDllAdapter`] with a concrete
//! [`algotrade_broker::profit_dll::ProfitDllTransport`] supplied by whatever process owns the
//! DLL's FFI boundary — that transport is outside this workspace's scope (§1) and is not
//! constructed here.

use algotrade::prelude::*;
use algotrade_broker::MockBrokerAdapter;
use algotrade_client::{ClientChannel, ClientResponse, PendingRequest, Service, TradingCommand};
use algotrade_core::logging;
use algotrade_instrument::{InstrumentKind, StrategyInstanceId};
use algotrade_risk::MaxOrderQuantity;
use algotrade_strategies::SmaCrossStrategy;
use chrono::Utc;
use rust_decimal_macros::dec;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Registry key for the one strategy class this reference binary ships.
const SMA_CROSS_CLASS: &str = "SmaCross";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;
    if config.log_json {
        logging::init_json_logging();
    } else {
        logging::init_logging();
    }

    // The persistence backend is a plain sqlx sqlite file keyed by `DB_NAME` (§6); `DB_HOSTNAME`
    // and `DB_PASSWORD` are carried in `EngineConfig` for parity with §6's configuration table
    // but unused by this file-backed store.
    let database_url = format!("sqlite://{}.db", config.db.name);
    let persistence: Arc<dyn PersistenceStore> =
        Arc::new(SqlitePersistence::connect(&database_url).await?);

    let mut broker_registry = BrokerRegistry::new();
    broker_registry.register(BrokerId::Mock, || {
        let (adapter, events) = MockBrokerAdapter::new();
        (Box::new(adapter) as Box<dyn BrokerAdapter>, events)
    });
    let (broker, broker_events) = broker_registry
        .build(BrokerId::Mock)
        .expect("BrokerId::Mock was just registered above");

    let risk: Box<dyn RiskManager> = Box::new(MaxOrderQuantity::new(dec!(100)));

    let mut strategy_registry = StrategyRegistry::new();
    strategy_registry.register(SMA_CROSS_CLASS, || SmaCrossStrategy::new(9, 21, dec!(1)));

    let listen_port = config.listen_port;
    let now = Utc::now();
    let mut manager = TradeManager::new(
        config,
        persistence,
        broker,
        broker_events,
        risk,
        strategy_registry,
        now,
    );
    manager.start(now).await?;

    let instrument = Instrument::new("PETR4", InstrumentKind::Spot, BrokerId::Mock, "PETR4");
    manager.open_strategy(
        StrategyInstanceId::random(),
        SMA_CROSS_CLASS,
        serde_json::json!({ "fast": 9, "slow": 21, "stop_percent": 1.0 }),
        instrument,
        Duration::from_secs(60),
        Duration::from_secs(60),
    )?;

    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<PendingRequest>();
    let listen_addr: SocketAddr = format!("0.0.0.0:{listen_port}").parse()?;
    let client_channel = ClientChannel::bind(listen_addr, outbound_tx).await?;
    tokio::spawn(client_channel.run());
    tracing::info!(%listen_addr, "client channel listening");

    run_engine_loop(manager, outbound_rx).await
}

async fn run_engine_loop(
    mut manager: TradeManager,
    mut outbound_rx: mpsc::UnboundedReceiver<PendingRequest>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(error) = manager.tick(Utc::now()).await {
                    tracing::error!(%error, "engine tick failed");
                }
            }
            pending = outbound_rx.recv() => {
                match pending {
                    Some(pending) => handle_pending_request(&mut manager, pending).await,
                    None => {
                        tracing::warn!("client channel outbound sender dropped, exiting");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                let _ = manager
                    .handle_event(EngineEvent::shutdown(), Utc::now())
                    .await;
                break;
            }
        }
    }

    Ok(())
}

/// Decodes one request off the Client Channel, routes trading commands into the Trade Manager,
/// and replies through the request's own oneshot channel (§4.7, §6).
async fn handle_pending_request(manager: &mut TradeManager, pending: PendingRequest) {
    let PendingRequest { request, peer, reply } = pending;
    let srv_op_id = request.srv_op_id;

    let response = match Service::try_from(request.service) {
        Ok(Service::TradingCommand) => match TradingCommand::try_from(&request.data) {
            Ok(command) => {
                let event = EngineEvent::from(Command::from(command));
                match manager.handle_event(event, Utc::now()).await {
                    Ok(_) => ClientResponse::ok(srv_op_id),
                    Err(error) => ClientResponse::error(srv_op_id, error.to_string()),
                }
            }
            Err(error) => ClientResponse::error(srv_op_id, error.to_string()),
        },
        Ok(other) => {
            ClientResponse::error(srv_op_id, format!("service {other:?} is not wired up by this binary"))
        }
        Err(error) => ClientResponse::error(srv_op_id, error.to_string()),
    };

    if reply.send(response).is_err() {
        tracing::warn!(%peer, "client disconnected before its response could be delivered");
    }
}
