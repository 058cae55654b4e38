//! Printable and serializable statistics reports.
//!
//! Text rendering is line oriented: `#`-prefixed header lines followed by one
//! row per tag (usage) or prefix length (coverage). Every report also
//! serializes to JSON.

use std::fmt;

use serde::Serialize;

use crate::tag::{TagId, TagPolicy};

/// `count` as a percentage of `total`, or zero when `total` is zero.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// One tag in a [`UsageReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageRow {
    /// Field tag
    pub tag: TagId,
    /// Records using the tag
    pub count: u64,
    /// `count` as a percentage of all analyzed records
    pub percent: f64,
}

/// Tag usage across a collection, most used tag first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageReport {
    /// Tag extraction policy the counts were taken with
    pub policy: TagPolicy,
    /// Records analyzed
    pub num_records: u64,
    /// Records skipped as malformed
    pub num_bad: u64,
    /// Rows, by descending count then ascending tag
    pub rows: Vec<UsageRow>,
}

impl fmt::Display for UsageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# Read {} records (ignored {} bad), with the following field occurrences:",
            self.num_records, self.num_bad
        )?;
        if self.policy == TagPolicy::CollapseRuns {
            writeln!(f, "# Repeated tags counted once per run of adjacent fields")?;
        }
        for row in &self.rows {
            writeln!(f, "{}  {:8}  {:4.1}%", row.tag, row.count, row.percent)?;
        }
        Ok(())
    }
}

/// One prefix length in a [`CoverageReport`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    /// Number of leading tags of the order in this prefix
    pub prefix_len: usize,
    /// Last tag of the prefix
    pub tag: TagId,
    /// Printable prefix summary, e.g. `3 tags (001,008,245)`
    pub label: String,
    /// Records fully covered by the prefix
    pub total: u64,
    /// Records first covered at this prefix length
    pub added: u64,
    /// `total` as a percentage of all analyzed records
    pub percent: f64,
}

/// Cumulative coverage of a collection by growing tag-order prefixes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    /// Records analyzed
    pub num_records: u64,
    /// Records skipped as malformed
    pub num_bad: u64,
    /// Analyzed records using a tag outside the order
    pub num_uncovered: u64,
    /// One row per prefix length, shortest first
    pub rows: Vec<CoverageRow>,
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "# Read {} records (ignored {} bad), with the following coverage results:",
            self.num_records, self.num_bad
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<30}  {:8} (+{:6})  {:4.1}%",
                row.label, row.total, row.added, row.percent
            )?;
        }
        writeln!(
            f,
            "# {} records use tags outside the order",
            self.num_uncovered
        )
    }
}
