//! FILENAME: core/profile-engine/src/value.rs
//! Column Value - the closed set of scalar types a dataset cell can hold.
//!
//! Values are used both as group keys (so they must be hashable and totally
//! ordered) and as secondary measurements (so they must expose a numeric view).
//!
//! Ordering:
//! - Null sorts before everything else
//! - Integer and Float compare by numeric value; on a numeric tie the Integer
//!   sorts first (the two remain distinct keys)
//! - Floats: -0.0 equals 0.0, all NaNs are equal and sort after every number
//! - Text sorts after all numbers, byte-wise

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// A single scalar fetched from a dataset column.
///
/// Serializes untagged: `null`, a JSON integer, a JSON number or a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view used for secondary measurements.
    /// Text, Null and NaN are not measurements.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// Collapses float spellings that compare equal (-0.0 and 0.0, NaN
    /// payloads) to one representative, so equal keys serialize identically.
    pub fn canonicalize(self) -> Self {
        match self {
            Value::Float(f) if f.is_nan() => Value::Float(f64::NAN),
            Value::Float(f) if f == 0.0 => Value::Float(0.0),
            other => other,
        }
    }

    /// Type rank for cross-type ordering.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

// ============================================================================
// FLOAT HELPERS
// ============================================================================

/// Total order over f64 where NaN == NaN (greatest) and -0.0 == 0.0.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Bit pattern that agrees with `compare_floats` equality.
fn canonical_bits(f: f64) -> u64 {
    if f.is_nan() {
        u64::MAX
    } else if f == 0.0 {
        0
    } else {
        f.to_bits()
    }
}

// ============================================================================
// EQUALITY / HASHING / ORDERING
// ============================================================================

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Integer(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                2u8.hash(state);
                canonical_bits(*f).hash(state);
            }
            Value::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => compare_floats(*a, *b),
            (Value::Integer(a), Value::Float(b)) => {
                compare_floats(*a as f64, *b).then(Ordering::Less)
            }
            (Value::Float(a), Value::Integer(b)) => {
                compare_floats(*a, *b as f64).then(Ordering::Greater)
            }
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}
