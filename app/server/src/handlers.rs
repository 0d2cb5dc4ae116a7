//! FILENAME: app/server/src/handlers.rs
//! HTTP handlers.
//!
//! Dataset access is blocking (SQLite, file reads), so every handler that
//! touches storage moves that work onto the blocking pool and only awaits
//! the result.

use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::Json;
use datasets::DatasetError;
use profile_engine::Report;
use tokio::task::spawn_blocking;

use crate::api_types::{ColumnList, DatabaseList, HealthResponse, TableList};
use crate::error::ApiError;
use crate::{log_enter, log_exit, log_info, AppState};

/// Multipart field carrying an uploaded dataset.
pub const UPLOAD_FIELD: &str = "db";

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /database/`
pub async fn list_databases(State(state): State<Arc<AppState>>) -> Json<DatabaseList> {
    Json(DatabaseList {
        databases: state.repository.list(),
    })
}

/// `POST /database/` with the file in multipart field `db`.
pub async fn upload_database(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<DatabaseList>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::BadRequest(format!("field '{}' is not a file", UPLOAD_FIELD)))?;
        let contents = field.bytes().await?;
        log_enter!("UPLOAD", "upload_database", "file={} bytes={}", filename, contents.len());

        let repository = Arc::clone(&state.repository);
        let name = spawn_blocking(move || repository.register(&filename, &contents)).await??;

        log_info!("UPLOAD", "registered dataset {}", name);
        return Ok(Json(DatabaseList {
            databases: state.repository.list(),
        }));
    }

    Err(ApiError::BadRequest(format!(
        "no file uploaded in field '{}'",
        UPLOAD_FIELD
    )))
}

/// `GET /database/{db_name}/`
pub async fn database_tables(
    State(state): State<Arc<AppState>>,
    Path(db_name): Path<String>,
) -> Result<Json<TableList>, ApiError> {
    log_enter!("QUERY", "database_tables", "db={}", db_name);

    let executor = Arc::clone(&state.executor);
    let tables = spawn_blocking(move || executor.tables(&db_name)).await??;

    log_exit!("QUERY", "database_tables", "tables={}", tables.len());
    Ok(Json(TableList { tables }))
}

/// `GET /database/{db_name}/{table_name}/`
pub async fn table_columns(
    State(state): State<Arc<AppState>>,
    Path((db_name, table_name)): Path<(String, String)>,
) -> Result<Json<ColumnList>, ApiError> {
    log_enter!("QUERY", "table_columns", "db={} table={}", db_name, table_name);

    let executor = Arc::clone(&state.executor);
    let columns = spawn_blocking(move || executor.columns(&db_name, &table_name)).await??;

    log_exit!("QUERY", "table_columns", "columns={}", columns.len());
    Ok(Json(ColumnList { columns }))
}

/// `GET /database/{db_name}/{table_name}/{col_name}/`
///
/// Fetches (column, secondary) pairs and returns the aggregated report.
pub async fn column_profile(
    State(state): State<Arc<AppState>>,
    Path((db_name, table_name, col_name)): Path<(String, String, String)>,
) -> Result<Json<Report>, ApiError> {
    log_enter!(
        "PROFILE",
        "column_profile",
        "db={} table={} column={}",
        db_name,
        table_name,
        col_name
    );

    let worker_state = Arc::clone(&state);
    let report = spawn_blocking(move || -> Result<Report, DatasetError> {
        let rows = worker_state.executor.fetch_pairs(
            &db_name,
            &table_name,
            &col_name,
            &worker_state.config.secondary_column,
        )?;
        Ok(worker_state.aggregator.aggregate(&rows))
    })
    .await??;

    log_exit!(
        "PROFILE",
        "column_profile",
        "distinct={} rows={} missing={}",
        report.distinct_count,
        report.total_rows,
        report.missing_rows
    );
    Ok(Json(report))
}
