//! FILENAME: app/server/src/lib.rs
// PURPOSE: Service library: application state and HTTP router.
// CONTEXT: The dataset registry lives in `AppState` and is injected into every
//          handler; nothing about datasets is process-global.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use datasets::{DatasetError, DatasetExecutor, DatasetRepository, DirectoryRepository, QueryExecutor};
use profile_engine::Aggregator;

pub mod api_types;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;

pub use api_types::{ColumnList, DatabaseList, ErrorBody, HealthResponse, TableList};
pub use config::ServerConfig;
pub use error::ApiError;
pub use logging::{init_log_file, install_log_bridge, next_seq, write_log};

// ============================================================================
// APPLICATION STATE
// ============================================================================

pub struct AppState {
    pub config: ServerConfig,
    /// Registry of known datasets.
    pub repository: Arc<dyn DatasetRepository>,
    /// Fetches rows for the registered datasets.
    pub executor: Arc<dyn QueryExecutor>,
    pub aggregator: Aggregator,
}

impl AppState {
    /// Assembles state from explicit collaborators.
    pub fn new(
        config: ServerConfig,
        repository: Arc<dyn DatasetRepository>,
        executor: Arc<dyn QueryExecutor>,
    ) -> Self {
        let aggregator = Aggregator::new(config.profile_settings());
        AppState {
            config,
            repository,
            executor,
            aggregator,
        }
    }
}

/// Opens the datasets folder named in `config` and wires the default executor.
pub fn create_app_state(config: ServerConfig) -> Result<AppState, DatasetError> {
    let repository: Arc<dyn DatasetRepository> =
        Arc::new(DirectoryRepository::open(&config.databases_dir)?);
    let executor: Arc<dyn QueryExecutor> = Arc::new(DatasetExecutor::new(Arc::clone(&repository)));

    log_info!(
        "INIT",
        "datasets_dir={} datasets={} secondary={} max_groups={}",
        config.databases_dir.display(),
        repository.list().len(),
        config.secondary_column,
        config.max_groups
    );

    Ok(AppState::new(config, repository, executor))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/database/",
            get(handlers::list_databases).post(handlers::upload_database),
        )
        .route("/database/{db_name}/", get(handlers::database_tables))
        .route(
            "/database/{db_name}/{table_name}/",
            get(handlers::table_columns),
        )
        .route(
            "/database/{db_name}/{table_name}/{col_name}/",
            get(handlers::column_profile),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
