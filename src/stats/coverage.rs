//! Tag-order coverage buckets.
//!
//! Each record lands in exactly one bucket: the shortest prefix of the tag
//! order that contains all of its tags. Records using any tag outside the
//! order land in no bucket and are counted as uncovered.

use indexmap::IndexMap;

use crate::error::MarcError;
use crate::record::Record;
use crate::report::{percent, CoverageReport, CoverageRow};
use crate::tag::{distinct_tags, TagId};

use super::tag_order::{tag_summary, TagOrder};
use super::{Accumulator, RecordOutcome};

/// Coverage histogram over a fixed [`TagOrder`].
#[derive(Debug, Clone)]
pub struct CoverageStats {
    order: TagOrder,
    buckets: IndexMap<TagId, u64>,
    num_records: u64,
    num_bad: u64,
    num_uncovered: u64,
}

impl CoverageStats {
    /// Create an accumulator with one zeroed bucket per tag in `order`.
    #[must_use]
    pub fn new(order: TagOrder) -> Self {
        let buckets = order.iter().map(|tag| (tag, 0)).collect();
        CoverageStats {
            order,
            buckets,
            num_records: 0,
            num_bad: 0,
            num_uncovered: 0,
        }
    }

    /// The order buckets are keyed on.
    #[must_use]
    pub fn order(&self) -> &TagOrder {
        &self.order
    }

    /// Records whose deepest tag in the order is `tag`.
    #[must_use]
    pub fn bucket(&self, tag: TagId) -> Option<u64> {
        self.buckets.get(&tag).copied()
    }

    /// Bucket counts in rank order.
    pub fn buckets(&self) -> impl Iterator<Item = (TagId, u64)> + '_ {
        self.buckets.iter().map(|(&tag, &count)| (tag, count))
    }

    /// Records fully covered by some prefix.
    #[must_use]
    pub fn num_covered(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// Records using at least one tag the order does not list.
    #[must_use]
    pub fn num_uncovered(&self) -> u64 {
        self.num_uncovered
    }

    /// Build the cumulative coverage report, one row per prefix length.
    #[must_use]
    pub fn report(&self) -> CoverageReport {
        let tags = self.order.as_slice();
        let mut cumulative = 0;
        let rows = self
            .buckets()
            .enumerate()
            .map(|(index, (tag, added))| {
                cumulative += added;
                CoverageRow {
                    prefix_len: index + 1,
                    tag,
                    label: format!("{} tags ({})", index + 1, tag_summary(&tags[..=index])),
                    total: cumulative,
                    added,
                    percent: percent(cumulative, self.num_records),
                }
            })
            .collect();
        CoverageReport {
            num_records: self.num_records,
            num_bad: self.num_bad,
            num_uncovered: self.num_uncovered,
            rows,
        }
    }
}

impl Accumulator for CoverageStats {
    fn add(&mut self, record: &Record) -> RecordOutcome {
        let tags = match distinct_tags(record) {
            Ok(tags) => tags,
            Err(err) => {
                self.num_bad += 1;
                return RecordOutcome::Bad(err);
            },
        };
        self.num_records += 1;
        match self.order.covering_prefix(&tags) {
            Some(prefix_len) => {
                if let Some((_, count)) = self.buckets.get_index_mut(prefix_len - 1) {
                    *count += 1;
                }
                RecordOutcome::Counted
            },
            None => {
                self.num_uncovered += 1;
                RecordOutcome::Uncovered
            },
        }
    }

    fn mark_bad(&mut self, _error: &MarcError) {
        self.num_bad += 1;
    }

    fn num_records(&self) -> u64 {
        self.num_records
    }

    fn num_bad(&self) -> u64 {
        self.num_bad
    }
}
