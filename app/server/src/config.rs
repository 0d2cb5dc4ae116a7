//! FILENAME: app/server/src/config.rs
//! Server Configuration
//!
//! Priority (highest first):
//! 1. `DBVIEWER_*` environment variables
//! 2. The TOML file named by `DBVIEWER_CONFIG`
//! 3. Defaults

use std::path::{Path, PathBuf};

use profile_engine::{ProfileSettings, DEFAULT_MAX_GROUPS};
use serde::{Deserialize, Serialize};

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_databases_dir() -> PathBuf {
    PathBuf::from("databases")
}

fn default_secondary_column() -> String {
    "age".to_string()
}

fn default_max_groups() -> usize {
    DEFAULT_MAX_GROUPS
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_log_file() -> PathBuf {
    PathBuf::from("dbviewer.log")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Folder holding the dataset files.
    #[serde(default = "default_databases_dir")]
    pub databases_dir: PathBuf,

    /// Column whose mean is reported next to each distinct value.
    #[serde(default = "default_secondary_column")]
    pub secondary_column: String,

    /// Maximum number of distinct values returned per report.
    #[serde(default = "default_max_groups")]
    pub max_groups: usize,

    /// Largest accepted upload body.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Unified log file.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            databases_dir: default_databases_dir(),
            secondary_column: default_secondary_column(),
            max_groups: default_max_groups(),
            max_upload_bytes: default_max_upload_bytes(),
            log_file: default_log_file(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))
    }

    /// Load from `DBVIEWER_CONFIG` (if set) with environment overrides applied.
    pub fn load() -> Result<Self, String> {
        let mut config = match std::env::var("DBVIEWER_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("DBVIEWER_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Ok(dir) = std::env::var("DBVIEWER_DATABASES_DIR") {
            self.databases_dir = PathBuf::from(dir);
        }
        if let Ok(column) = std::env::var("DBVIEWER_SECONDARY_COLUMN") {
            self.secondary_column = column;
        }
        if let Ok(max_groups) = std::env::var("DBVIEWER_MAX_GROUPS") {
            if let Ok(n) = max_groups.parse() {
                self.max_groups = n;
            }
        }
        if let Ok(max_upload) = std::env::var("DBVIEWER_MAX_UPLOAD_BYTES") {
            if let Ok(n) = max_upload.parse() {
                self.max_upload_bytes = n;
            }
        }
        if let Ok(log_file) = std::env::var("DBVIEWER_LOG_FILE") {
            self.log_file = PathBuf::from(log_file);
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.trim().is_empty() {
            return Err("Listen address cannot be empty".to_string());
        }
        if self.databases_dir.as_os_str().is_empty() {
            return Err("Databases directory cannot be empty".to_string());
        }
        if self.secondary_column.trim().is_empty() {
            return Err("Secondary column cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn profile_settings(&self) -> ProfileSettings {
        ProfileSettings::with_max_groups(self.max_groups)
    }
}
