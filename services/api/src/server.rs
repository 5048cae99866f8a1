use crate::cli::ServeArgs;
use crate::infra::{
    default_intake_limits, AppState, InMemoryApplicationRepository, InMemoryNotificationLog,
    LoggingBrokerGateway,
};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mortgage_intake::config::AppConfig;
use mortgage_intake::error::AppError;
use mortgage_intake::telemetry;
use mortgage_intake::workflows::intake::IntakeService;
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

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let notifications = Arc::new(InMemoryNotificationLog::default());
    let broker = Arc::new(LoggingBrokerGateway::default());
    let intake_service = Arc::new(IntakeService::new(
        repository,
        notifications,
        broker,
        default_intake_limits(),
        config.support.clone(),
    ));

    let app = with_intake_routes(intake_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mortgage intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
