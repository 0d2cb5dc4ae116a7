//! FILENAME: core/datasets/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("database does not exist: {0}")]
    NotFound(String),

    #[error("database filename already exists: {0}")]
    AlreadyExists(String),

    #[error("extension error: only accept .db, .csv and .txt ({0})")]
    UnsupportedExtension(String),

    #[error("invalid filename: {0:?}")]
    InvalidFilename(String),

    #[error("table does not exist: {0}")]
    UnknownTable(String),

    #[error("column does not exist: {0}")]
    UnknownColumn(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
