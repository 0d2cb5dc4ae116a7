//! FILENAME: app/server/src/api_types.rs
// PURPOSE: Response bodies for the HTTP API.
// CONTEXT: Field names are part of the wire contract with the browser client.

use datasets::ColumnInfo;
use serde::{Deserialize, Serialize};

/// `GET /database/` and `POST /database/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseList {
    pub databases: Vec<String>,
}

/// `GET /database/{db}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableList {
    pub tables: Vec<String>,
}

/// `GET /database/{db}/{table}/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnList {
    pub columns: Vec<ColumnInfo>,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub sub_code: u16,
    pub message: String,
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
