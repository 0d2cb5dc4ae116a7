//! FILENAME: core/profile-engine/src/engine.rs
//! Profile Engine - turns raw (primary, secondary) rows into a ranked report.
//!
//! Algorithm:
//! 1. Drop rows whose primary value is null
//! 2. Group by primary value, accumulating count and numeric secondaries
//! 3. Finalize each group's secondary mean
//! 4. Rank by count descending, ties broken by ascending key
//! 5. Keep the first `max_groups`; the counts of the rest become `missing_rows`
//!
//! The engine is stateless: every call builds its own map and returns an owned
//! `Report`, so an `Aggregator` can be shared freely across threads.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::accumulator::GroupAccumulator;
use crate::definition::{ProfileSettings, RawRow};
use crate::report::{Group, Report};
use crate::value::Value;

/// Ranking order: most frequent first, then by key.
fn rank_groups(a: &Group, b: &Group) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
}

// ============================================================================
// AGGREGATOR
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregator {
    settings: ProfileSettings,
}

impl Aggregator {
    pub fn new(settings: ProfileSettings) -> Self {
        Aggregator { settings }
    }

    pub fn settings(&self) -> &ProfileSettings {
        &self.settings
    }

    /// Aggregates a materialized row set.
    pub fn aggregate(&self, rows: &[RawRow]) -> Report {
        let mut groups: FxHashMap<&Value, GroupAccumulator> = FxHashMap::default();

        for row in rows {
            if row.primary.is_null() {
                continue;
            }
            groups.entry(&row.primary).or_default().add_row(&row.secondary);
        }

        self.finish(
            groups
                .into_iter()
                .map(|(key, acc)| {
                    Group::new(key.clone().canonicalize(), acc.count, acc.mean())
                }),
        )
    }

    /// Aggregates owned rows from any iterator, without an intermediate vector.
    pub fn aggregate_iter<I>(&self, rows: I) -> Report
    where
        I: IntoIterator<Item = RawRow>,
    {
        let mut groups: FxHashMap<Value, GroupAccumulator> = FxHashMap::default();

        for RawRow { primary, secondary } in rows {
            if primary.is_null() {
                continue;
            }
            groups.entry(primary.canonicalize()).or_default().add_row(&secondary);
        }

        self.finish(
            groups
                .into_iter()
                .map(|(key, acc)| Group::new(key, acc.count, acc.mean())),
        )
    }

    /// Ranks, truncates and accounts for the finalized groups.
    fn finish(&self, groups: impl Iterator<Item = Group>) -> Report {
        let mut groups: Vec<Group> = groups.collect();
        let distinct_count = groups.len();
        let total_rows: u64 = groups.iter().map(|g| g.count).sum();
        let limit = self.settings.max_groups;

        // Only the retained prefix needs a full sort.
        if limit < groups.len() {
            if limit > 0 {
                groups.select_nth_unstable_by(limit - 1, rank_groups);
            }
            let dropped = groups.split_off(limit);
            let missing_rows: u64 = dropped.iter().map(|g| g.count).sum();
            groups.sort_unstable_by(rank_groups);

            return Report {
                distinct_count,
                total_rows,
                missing_rows,
                groups,
            };
        }

        groups.sort_unstable_by(rank_groups);
        Report {
            distinct_count,
            total_rows,
            missing_rows: 0,
            groups,
        }
    }
}

/// Aggregates `rows` with the default settings (at most 100 groups).
pub fn aggregate(rows: &[RawRow]) -> Report {
    Aggregator::default().aggregate(rows)
}
