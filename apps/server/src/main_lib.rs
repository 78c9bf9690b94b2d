use std::sync::Arc;

use kamai_core::{
    certificates::{CertificateService, CertificateServiceTrait},
    metrics::{MetricsService, MetricsServiceTrait},
    uploads::{UploadRepositoryTrait, UploadService, UploadServiceTrait},
};
use kamai_storage_sqlite::{
    certificates::CertificateRepository, create_pool, init, run_migrations, spawn_writer,
    uploads::UploadRepository, DbPool,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{config::Config, scheduler::start_session_sweeper, session::SessionRegistry};

pub struct AppState {
    pub pool: Arc<DbPool>,
    pub upload_service: Arc<dyn UploadServiceTrait>,
    pub metrics_service: Arc<dyn MetricsServiceTrait>,
    pub certificate_service: Arc<dyn CertificateServiceTrait>,
    pub sessions: SessionRegistry,
}

/// Installs the global subscriber. `KAMAI_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("KAMAI_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialised: {}", e);
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let upload_repository: Arc<dyn UploadRepositoryTrait> =
        Arc::new(UploadRepository::new(pool.clone(), writer.clone()));
    let certificate_repository = Arc::new(CertificateRepository::new(pool.clone(), writer));

    let upload_service = Arc::new(UploadService::new(upload_repository.clone()));
    let metrics_service = Arc::new(MetricsService::new(upload_repository.clone()));
    let certificate_service = Arc::new(CertificateService::new(
        certificate_repository,
        upload_repository,
    ));

    let state = Arc::new(AppState {
        pool,
        upload_service,
        metrics_service,
        certificate_service,
        sessions: SessionRegistry::new(),
    });
    start_session_sweeper(&state, config.session_idle_timeout);
    Ok(state)
}
