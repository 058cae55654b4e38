//! Per-tag usage counts.

use std::collections::BTreeMap;

use crate::error::MarcError;
use crate::record::Record;
use crate::report::{percent, UsageReport, UsageRow};
use crate::tag::{TagId, TagPolicy};

use super::{Accumulator, RecordOutcome};

/// Counts how many records use each tag.
///
/// Under the default [`TagPolicy::Distinct`] a tag adds at most one to its
/// counter per record, so every count is bounded by
/// [`num_records`](Accumulator::num_records). Only tags seen at least once
/// have a counter.
///
/// ```
/// use marc_stats::stats::{Accumulator, UsageStats};
/// use marc_stats::{Field, Record, TagId};
///
/// let mut record = Record::new();
/// record.add_control_field_str("001", "x");
/// record.add_field(Field::new("650".to_string(), ' ', '0'));
/// record.add_field(Field::new("650".to_string(), ' ', '0'));
///
/// let mut stats = UsageStats::new();
/// stats.add(&record);
/// assert_eq!(stats.count(TagId::new(650)), 1);
/// assert_eq!(stats.num_records(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageStats {
    policy: TagPolicy,
    counts: BTreeMap<TagId, u64>,
    num_records: u64,
    num_bad: u64,
}

impl UsageStats {
    /// Create an empty accumulator using [`TagPolicy::Distinct`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty accumulator using `policy`.
    #[must_use]
    pub fn with_policy(policy: TagPolicy) -> Self {
        UsageStats {
            policy,
            ..Self::default()
        }
    }

    /// The extraction policy in use.
    #[must_use]
    pub fn policy(&self) -> TagPolicy {
        self.policy
    }

    /// Count for `tag`; zero if never seen.
    #[must_use]
    pub fn count(&self, tag: TagId) -> u64 {
        self.counts.get(&tag).copied().unwrap_or(0)
    }

    /// All non-zero counters in ascending tag order.
    pub fn counts(&self) -> impl Iterator<Item = (TagId, u64)> + '_ {
        self.counts.iter().map(|(&tag, &count)| (tag, count))
    }

    /// Number of distinct tags seen.
    #[must_use]
    pub fn distinct_tags(&self) -> usize {
        self.counts.len()
    }

    /// Build the usage report: every seen tag, most used first.
    #[must_use]
    pub fn report(&self) -> UsageReport {
        let mut rows: Vec<UsageRow> = self
            .counts()
            .map(|(tag, count)| UsageRow {
                tag,
                count,
                percent: percent(count, self.num_records),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.tag.cmp(&b.tag)));
        UsageReport {
            policy: self.policy,
            num_records: self.num_records,
            num_bad: self.num_bad,
            rows,
        }
    }
}

impl Accumulator for UsageStats {
    fn add(&mut self, record: &Record) -> RecordOutcome {
        match self.policy.extract(record) {
            Ok(tags) => {
                for tag in tags {
                    *self.counts.entry(tag).or_insert(0) += 1;
                }
                self.num_records += 1;
                RecordOutcome::Counted
            },
            Err(err) => {
                self.num_bad += 1;
                RecordOutcome::Bad(err)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;

    fn record_with(tags: &[&str]) -> Record {
        let mut record = Record::new();
        for tag in tags {
            record.add_field(Field::new((*tag).to_string(), ' ', ' '));
        }
        record
    }

    #[test]
    fn test_counts_each_tag_once_per_record() {
        let mut stats = UsageStats::new();
        assert!(matches!(
            stats.add(&record_with(&["001", "245", "650", "650"])),
            RecordOutcome::Counted
        ));
        stats.add(&record_with(&["001", "100"]));

        assert_eq!(stats.num_records(), 2);
        assert_eq!(stats.count(TagId::new(1)), 2);
        assert_eq!(stats.count(TagId::new(650)), 1);
        assert_eq!(stats.count(TagId::new(100)), 1);
        assert_eq!(stats.count(TagId::new(999)), 0);
        assert_eq!(stats.distinct_tags(), 4);
    }

    #[test]
    fn test_bad_tag_leaves_counters_untouched() {
        let mut stats = UsageStats::new();
        stats.add(&record_with(&["001"]));
        let outcome = stats.add(&record_with(&["100", "ABC"]));

        assert!(outcome.is_bad());
        assert_eq!(stats.num_records(), 1);
        assert_eq!(stats.num_bad(), 1);
        assert_eq!(stats.count(TagId::new(100)), 0);
    }

    #[test]
    fn test_collapse_runs_counts_separated_repeats() {
        let mut stats = UsageStats::with_policy(TagPolicy::CollapseRuns);
        stats.add(&record_with(&["100", "100", "245", "100"]));
        assert_eq!(stats.count(TagId::new(100)), 2);
        assert_eq!(stats.count(TagId::new(245)), 1);
    }

    #[test]
    fn test_empty_record_counts_as_record() {
        let mut stats = UsageStats::new();
        stats.add(&Record::new());
        assert_eq!(stats.num_records(), 1);
        assert_eq!(stats.counts().count(), 0);
    }

    #[test]
    fn test_report_orders_by_count_then_tag() {
        let mut stats = UsageStats::new();
        stats.add(&record_with(&["245", "650"]));
        stats.add(&record_with(&["245", "100"]));
        stats.add(&record_with(&["245"]));

        let report = stats.report();
        let order: Vec<u32> = report.rows.iter().map(|r| r.tag.value()).collect();
        assert_eq!(order, [245, 100, 650]);
        assert!((report.rows[0].percent - 100.0).abs() < f64::EPSILON);
    }
}
