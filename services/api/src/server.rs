use crate::cli::ServeArgs;
use crate::demo::{seed_directory, seed_snapshots};
use crate::infra::{AppState, InMemoryRoomStore, LoggingGateway};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use rent_ledger::calendar::EthiopianDate;
use rent_ledger::config::AppConfig;
use rent_ledger::error::AppError;
use rent_ledger::notifications::{
    DispatchError, EngineState, NotificationDispatcher, Scheduler,
};
use rent_ledger::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let today = EthiopianDate::from_gregorian(Local::now().date_naive());
    let snapshots = seed_snapshots(config.notifications.rent_amount, today)
        .map_err(DispatchError::from)?;
    let store = Arc::new(InMemoryRoomStore::new(snapshots));
    let directory = Arc::new(seed_directory());
    let gateway = Arc::new(LoggingGateway::default());

    let dispatcher = Arc::new(NotificationDispatcher::new(store, directory, gateway));
    let scheduler = Arc::new(Scheduler::new(
        dispatcher.clone(),
        config.scheduler.scan_interval,
    ));
    scheduler.start();

    let engine = EngineState {
        dispatcher,
        scheduler,
        cron_secret: config.notifications.cron_secret.clone(),
    };

    let app = app_router(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rent notification service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
