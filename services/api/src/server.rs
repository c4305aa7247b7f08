use crate::cli::ServeArgs;
use crate::infra::{seed_templates, AppState};
use crate::routes::with_review_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use perf_review::config::AppConfig;
use perf_review::error::AppError;
use perf_review::reviews::{InMemoryReviewStore, InMemoryTemplateStore, ReviewService};
use perf_review::telemetry;
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

    let templates = seed_templates();
    let template_count = templates.len();
    let review_service = Arc::new(ReviewService::new(
        Arc::new(InMemoryReviewStore::default()),
        Arc::new(InMemoryTemplateStore::with_templates(templates)),
        config.workflow,
    ));

    let app = with_review_routes(review_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        templates = template_count,
        allow_pending_approval = config.workflow.allow_pending_approval,
        "performance review service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
