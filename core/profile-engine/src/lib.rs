//! FILENAME: core/profile-engine/src/lib.rs
//! Column profiling engine.
//!
//! Given the (primary, secondary) pairs of a column, computes per distinct
//! primary value an occurrence count and the mean of the paired secondary
//! values, ranks the values by frequency and returns a size-bounded report
//! that records how many rows fell outside the bound.
//!
//! Layers:
//! - `value`: The closed scalar type (what a cell can hold)
//! - `definition`: Inputs to a run (rows and settings)
//! - `accumulator`: Per-group running state
//! - `report`: The bounded output and its wire format
//! - `engine`: Grouping, ranking and truncation

pub mod value;
pub mod definition;
pub mod accumulator;
pub mod report;
pub mod engine;

pub use value::Value;
pub use definition::{ProfileSettings, RawRow, DEFAULT_MAX_GROUPS};
pub use accumulator::GroupAccumulator;
pub use report::{Group, Report};
pub use engine::{aggregate, Aggregator};
