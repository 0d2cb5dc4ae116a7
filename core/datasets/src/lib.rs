//! FILENAME: core/datasets/src/lib.rs
//! Dataset access for the column profiler.
//!
//! Owns everything between a dataset name on the wire and a materialized row
//! set: the registry of uploaded files, catalog lookups and row fetching for
//! SQLite databases and delimited text files.

mod delimited_reader;
mod error;
mod executor;
mod registry;
mod sqlite_reader;

pub use error::DatasetError;
pub use executor::{ColumnInfo, DatasetExecutor, QueryExecutor};
pub use registry::{
    allowed_file, secure_filename, Dataset, DatasetKind, DatasetRepository,
    DirectoryRepository,
};
