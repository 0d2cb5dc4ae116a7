//! FILENAME: app/server/src/main.rs
//! Dataset viewer HTTP server.
//!
//! # Endpoints
//! - `GET  /database/` - List registered datasets
//! - `POST /database/` - Upload a dataset (multipart field `db`)
//! - `GET  /database/{db}/` - List tables
//! - `GET  /database/{db}/{table}/` - List columns
//! - `GET  /database/{db}/{table}/{column}/` - Value distribution report
//! - `GET  /health` - Health check
//!
//! # Configuration
//! See `config.rs`: `DBVIEWER_CONFIG` names an optional TOML file and
//! `DBVIEWER_*` variables override individual settings.

use std::sync::Arc;

use log::LevelFilter;
use tokio::net::TcpListener;
use viewer_lib::{build_router, create_app_state, init_log_file, install_log_bridge};
use viewer_lib::{log_error, log_info, log_warn, ServerConfig};

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log_info!("INIT", "shutdown signal received"),
        Err(e) => {
            log_warn!("INIT", "failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[tokio::main]
async fn main() {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[CONFIG] {}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = init_log_file(&config.log_file) {
        eprintln!("[LOG_INIT] {}, logging to console only", e);
    }
    if let Err(e) = install_log_bridge(LevelFilter::Info) {
        eprintln!("[LOG_INIT] {}", e);
    }

    let state = match create_app_state(config.clone()) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            log_error!("INIT", "failed to open datasets: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match TcpListener::bind(config.listen_addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            log_error!("INIT", "failed to bind {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };
    log_info!("INIT", "listening on {}", config.listen_addr);

    let app = build_router(state);
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log_error!("INIT", "server error: {}", e);
        std::process::exit(1);
    }
}
