//! FILENAME: core/datasets/src/executor.rs
//! Query Executor - resolves dataset/table/column names and fetches rows.
//!
//! The executor is the only place user-supplied identifiers meet storage.
//! Table and column names are checked against the dataset's own catalog
//! before any query is built; an unknown name is an error, never a query.

use std::sync::Arc;

use profile_engine::RawRow;
use serde::{Deserialize, Serialize};

use crate::registry::{Dataset, DatasetKind, DatasetRepository};
use crate::{delimited_reader, sqlite_reader, DatasetError};

/// Description of one table column, shaped after SQLite's `PRAGMA table_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub cid: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub notnull: bool,
    pub default: Option<String>,
    pub pk: bool,
}

/// Fetches catalog information and raw (primary, secondary) pairs.
pub trait QueryExecutor: Send + Sync {
    /// Table names in the dataset, sorted by name.
    fn tables(&self, dataset: &str) -> Result<Vec<String>, DatasetError>;

    fn columns(&self, dataset: &str, table: &str) -> Result<Vec<ColumnInfo>, DatasetError>;

    /// Every row of `table` as a (`column`, `secondary`) pair. A missing
    /// secondary column yields null secondaries rather than an error.
    fn fetch_pairs(
        &self,
        dataset: &str,
        table: &str,
        column: &str,
        secondary: &str,
    ) -> Result<Vec<RawRow>, DatasetError>;
}

/// Executor over the datasets of a repository, dispatching on file kind.
pub struct DatasetExecutor {
    repository: Arc<dyn DatasetRepository>,
}

impl DatasetExecutor {
    pub fn new(repository: Arc<dyn DatasetRepository>) -> Self {
        DatasetExecutor { repository }
    }

    fn resolve(&self, dataset: &str) -> Result<Dataset, DatasetError> {
        self.repository.resolve(dataset)
    }
}

impl QueryExecutor for DatasetExecutor {
    fn tables(&self, dataset: &str) -> Result<Vec<String>, DatasetError> {
        let dataset = self.resolve(dataset)?;
        match dataset.kind {
            DatasetKind::Sqlite => sqlite_reader::list_tables(&dataset.path),
            DatasetKind::Delimited => delimited_reader::list_tables(&dataset.path),
        }
    }

    fn columns(&self, dataset: &str, table: &str) -> Result<Vec<ColumnInfo>, DatasetError> {
        let dataset = self.resolve(dataset)?;
        match dataset.kind {
            DatasetKind::Sqlite => sqlite_reader::table_columns(&dataset.path, table),
            DatasetKind::Delimited => delimited_reader::table_columns(&dataset.path, table),
        }
    }

    fn fetch_pairs(
        &self,
        dataset: &str,
        table: &str,
        column: &str,
        secondary: &str,
    ) -> Result<Vec<RawRow>, DatasetError> {
        let dataset = self.resolve(dataset)?;
        match dataset.kind {
            DatasetKind::Sqlite => {
                sqlite_reader::fetch_pairs(&dataset.path, table, column, secondary)
            }
            DatasetKind::Delimited => {
                delimited_reader::fetch_pairs(&dataset.path, table, column, secondary)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DirectoryRepository;
    use profile_engine::{aggregate, Group, Value};
    use tempfile::TempDir;

    fn setup() -> (TempDir, DatasetExecutor) {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("pets.csv"),
            "species,age\ncat,3\ncat,5\ndog,\n,9\n",
        )
        .unwrap();
        let repo = DirectoryRepository::open(dir.path()).unwrap();
        let executor = DatasetExecutor::new(Arc::new(repo));
        (dir, executor)
    }

    #[test]
    fn test_unregistered_dataset() {
        let (_dir, executor) = setup();

        assert!(matches!(
            executor.tables("../pets.csv"),
            Err(DatasetError::NotFound(_))
        ));
    }

    #[test]
    fn test_fetch_and_aggregate() {
        let (_dir, executor) = setup();

        assert_eq!(executor.tables("pets.csv").unwrap(), vec!["pets".to_string()]);

        let rows = executor.fetch_pairs("pets.csv", "pets", "species", "age").unwrap();
        let report = aggregate(&rows);

        assert_eq!(report.distinct_count, 2);
        assert_eq!(report.total_rows, 3);
        assert_eq!(
            report.groups,
            vec![
                Group::new(Value::from("cat"), 2, Some(4.0)),
                Group::new(Value::from("dog"), 1, None),
            ]
        );
    }

    #[test]
    fn test_column_info_wire_shape() {
        let info = ColumnInfo {
            cid: 0,
            name: "age".to_string(),
            declared_type: "INTEGER".to_string(),
            notnull: false,
            default: None,
            pk: false,
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cid": 0,
                "name": "age",
                "type": "INTEGER",
                "notnull": false,
                "default": null,
                "pk": false
            })
        );
    }
}
