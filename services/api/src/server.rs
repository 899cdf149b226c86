use crate::cli::ServeArgs;
use crate::infra::{local_admin, AppState, InMemoryDirectory, InMemorySessions};
use crate::routes::with_directory_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use schoolhub::config::{AppConfig, DirectoryConfig};
use schoolhub::directory::admin::AdminService;
use schoolhub::directory::{DirectoryService, SchoolImporter};
use schoolhub::error::AppError;
use schoolhub::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let (backend, sessions) = build_backend(&config.directory)?;
    let backend = Arc::new(backend);
    let directory_service = Arc::new(DirectoryService::new(backend.clone()));
    let admin_service = Arc::new(AdminService::new(backend, Arc::new(sessions)));

    let app = with_directory_routes(directory_service, admin_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "school directory ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_backend(
    config: &DirectoryConfig,
) -> Result<(InMemoryDirectory, InMemorySessions), AppError> {
    let schools = match &config.seed_csv {
        Some(path) => {
            let schools = SchoolImporter::from_path(path)?;
            info!(path = %path.display(), count = schools.len(), "seeded school directory");
            schools
        }
        None => {
            warn!("SCHOOLHUB_SEED_CSV not set; starting with an empty directory");
            Vec::new()
        }
    };
    let mut backend = InMemoryDirectory::seeded(schools);

    let sessions = match &config.admin_token {
        Some(token) => {
            let (user, profile) = local_admin(Utc::now());
            backend = backend.with_profile(profile);
            InMemorySessions::default().with_admin(token, user)
        }
        None => {
            warn!("SCHOOLHUB_ADMIN_TOKEN not set; admin routes will reject every request");
            InMemorySessions::default()
        }
    };

    Ok((backend, sessions))
}
