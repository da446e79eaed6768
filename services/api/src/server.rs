use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemorySubmissionRepository};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kt_tracker::config::AppConfig;
use kt_tracker::error::AppError;
use kt_tracker::telemetry;
use kt_tracker::tracking::TrackingService;
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

    let repository = Arc::new(InMemorySubmissionRepository::default());
    let tracking_service = Arc::new(TrackingService::new(repository, config.scoring));

    let app = with_operational_routes(tracking_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        green_threshold = config.scoring.green_threshold,
        amber_threshold = config.scoring.amber_threshold,
        variance_threshold = config.scoring.variance_threshold,
        "kt tracker ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
