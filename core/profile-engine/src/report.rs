//! FILENAME: core/profile-engine/src/report.rs
//! Profile Report - the bounded, ranked output of an aggregation run.
//!
//! The serialized form is the wire object the presentation layer hands to
//! clients:
//!
//! ```json
//! {
//!   "values_length": 2,
//!   "rows_length": 5,
//!   "missing_rows": 0,
//!   "values": [[1, 3, 22.5], [2, 2, 35.0]]
//! }
//! ```

use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};

use crate::value::Value;

// ============================================================================
// GROUP
// ============================================================================

/// Summary of all rows sharing one primary value.
/// Serialized as a 3-element array `[key, count, mean_or_null]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(Value, u64, Option<f64>)")]
pub struct Group {
    /// The distinct primary value.
    pub key: Value,

    /// Rows sharing this key (always >= 1).
    pub count: u64,

    /// Mean of the numeric secondary values in this group.
    pub secondary_mean: Option<f64>,
}

impl Group {
    pub fn new(key: Value, count: u64, secondary_mean: Option<f64>) -> Self {
        Group {
            key,
            count,
            secondary_mean,
        }
    }
}

impl From<(Value, u64, Option<f64>)> for Group {
    fn from((key, count, secondary_mean): (Value, u64, Option<f64>)) -> Self {
        Group::new(key, count, secondary_mean)
    }
}

/// A group key in wire form. Non-finite floats have no JSON number, so they
/// are written as their display text ("NaN", "inf", "-inf") instead of `null`.
struct WireKey<'a>(&'a Value);

impl Serialize for WireKey<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Float(f) if !f.is_finite() => serializer.serialize_str(&f.to_string()),
            key => key.serialize(serializer),
        }
    }
}

impl Serialize for Group {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&WireKey(&self.key))?;
        tuple.serialize_element(&self.count)?;
        // Overflowed sums are not representable in JSON.
        tuple.serialize_element(&self.secondary_mean.filter(|m| m.is_finite()))?;
        tuple.end()
    }
}

// ============================================================================
// REPORT
// ============================================================================

/// The result of profiling one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Number of groups formed, before truncation.
    #[serde(rename = "values_length")]
    pub distinct_count: usize,

    /// Rows that contributed to any group (null primaries excluded).
    #[serde(rename = "rows_length")]
    pub total_rows: u64,

    /// Rows belonging to groups cut off by truncation.
    pub missing_rows: u64,

    /// Ranked groups: count descending, then key ascending.
    #[serde(rename = "values")]
    pub groups: Vec<Group>,
}

impl Report {
    /// Rows accounted for by the groups actually present in the report.
    pub fn retained_rows(&self) -> u64 {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// True when some groups were dropped to honor the size bound.
    pub fn is_truncated(&self) -> bool {
        self.groups.len() < self.distinct_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        let report = Report {
            distinct_count: 3,
            total_rows: 6,
            missing_rows: 1,
            groups: vec![
                Group::new(Value::from("red"), 3, Some(22.5)),
                Group::new(Value::Integer(7), 2, None),
            ],
        };

        let wire = serde_json::to_value(&report).unwrap();
        assert_eq!(
            wire,
            json!({
                "values_length": 3,
                "rows_length": 6,
                "missing_rows": 1,
                "values": [["red", 3, 22.5], [7, 2, null]]
            })
        );
        assert!(report.is_truncated());
        assert_eq!(report.retained_rows(), 5);
    }

    #[test]
    fn test_non_finite_mean_serializes_as_null() {
        let group = Group::new(Value::Integer(1), 2, Some(f64::INFINITY));
        let wire = serde_json::to_value(&group).unwrap();
        assert_eq!(wire, json!([1, 2, null]));
    }

    #[test]
    fn test_non_finite_keys_are_never_null() {
        let groups = vec![
            Group::new(Value::Float(f64::NAN), 1, Some(30.0)),
            Group::new(Value::Float(f64::INFINITY), 1, Some(40.0)),
            Group::new(Value::Float(f64::NEG_INFINITY), 1, None),
        ];

        let wire = serde_json::to_value(&groups).unwrap();
        assert_eq!(
            wire,
            json!([["NaN", 1, 30.0], ["inf", 1, 40.0], ["-inf", 1, null]])
        );
    }

    #[test]
    fn test_report_reads_back_from_wire() {
        let wire = json!({
            "values_length": 1,
            "rows_length": 4,
            "missing_rows": 0,
            "values": [[1.5, 4, 10.0]]
        });

        let report: Report = serde_json::from_value(wire).unwrap();
        assert_eq!(report.distinct_count, 1);
        assert_eq!(report.groups[0], Group::new(Value::Float(1.5), 4, Some(10.0)));
    }
}
