//! FILENAME: core/profile-engine/src/accumulator.rs
//! Group Accumulator - running state for one distinct primary value.
//!
//! Every row that lands in a group bumps `count`. Only rows with a numeric
//! secondary value feed the mean, so `count_numbers <= count`.

use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupAccumulator {
    /// Rows seen for this key.
    pub count: u64,
    /// Rows whose secondary value was numeric.
    pub count_numbers: u64,
    /// Sum of numeric secondary values.
    pub sum: f64,
}

impl GroupAccumulator {
    pub fn new() -> Self {
        GroupAccumulator::default()
    }

    /// Records one row with the given secondary value.
    pub fn add_row(&mut self, secondary: &Value) {
        self.count += 1;
        if let Some(measurement) = secondary.as_f64() {
            self.count_numbers += 1;
            self.sum += measurement;
        }
    }

    /// Mean of the numeric secondary values, or None if there were none.
    pub fn mean(&self) -> Option<f64> {
        if self.count_numbers > 0 {
            Some(self.sum / self.count_numbers as f64)
        } else {
            None
        }
    }
}
