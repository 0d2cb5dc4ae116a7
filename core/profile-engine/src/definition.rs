//! FILENAME: core/profile-engine/src/definition.rs
//! Profile Definition - the inputs to an aggregation run.
//!
//! A run consumes a sequence of `RawRow`s (one per source row) and is shaped
//! by `ProfileSettings`. Both are plain data; nothing here does any work.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Maximum number of groups returned in a report unless configured otherwise.
pub const DEFAULT_MAX_GROUPS: usize = 100;

/// One source row as fetched by the query executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    /// The value of the profiled column. Null rows are never grouped.
    pub primary: Value,

    /// The paired measurement. Null means "no measurement for this row".
    pub secondary: Value,
}

impl RawRow {
    pub fn new(primary: impl Into<Value>, secondary: impl Into<Value>) -> Self {
        RawRow {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

/// Settings for an aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSettings {
    /// Upper bound on the number of groups kept in the report.
    /// Groups ranked beyond it are accounted for in `missing_rows`.
    pub max_groups: usize,
}

impl ProfileSettings {
    pub fn with_max_groups(max_groups: usize) -> Self {
        ProfileSettings { max_groups }
    }
}

impl Default for ProfileSettings {
    fn default() -> Self {
        ProfileSettings {
            max_groups: DEFAULT_MAX_GROUPS,
        }
    }
}
