//! Numeric field tags and tag extraction from records.
//!
//! Statistics work on [`TagId`] values rather than the raw tag strings found in
//! records: `"008"` and `"8"` are the same tag, and a tag that is not a number
//! at all makes the whole record unusable.
//!
//! Two extraction policies are offered by [`TagPolicy`]:
//!
//! - [`TagPolicy::Distinct`] (the canonical "usage" statistic) yields every
//!   tag the record uses exactly once.
//! - [`TagPolicy::CollapseRuns`] keeps document order and only merges tags
//!   repeated back to back, so `100 245 100` yields `100` twice.
//!
//! # Examples
//!
//! ```
//! use marc_stats::{Field, Record, TagId, TagPolicy};
//!
//! let mut record = Record::new();
//! for tag in ["100", "245", "100"] {
//!     record.add_field(Field::new(tag.to_string(), ' ', ' '));
//! }
//!
//! let distinct = TagPolicy::Distinct.extract(&record).unwrap();
//! assert_eq!(distinct, [TagId::new(100), TagId::new(245)]);
//!
//! let runs = TagPolicy::CollapseRuns.extract(&record).unwrap();
//! assert_eq!(runs, [TagId::new(100), TagId::new(245), TagId::new(100)]);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MarcError, Result};
use crate::record::Record;

/// An integer field tag. Displays zero-padded to three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(u32);

impl TagId {
    /// Create a tag id from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        TagId(value)
    }

    /// The numeric value of the tag.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Parse a raw tag string.
    ///
    /// Surrounding whitespace is ignored; anything other than ASCII digits is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidTag`] if the tag is empty, not numeric or
    /// too large.
    pub fn parse(raw: &str) -> Result<Self> {
        let digits = raw.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(MarcError::InvalidTag(raw.to_string()));
        }
        digits
            .parse::<u32>()
            .map(TagId)
            .map_err(|_| MarcError::InvalidTag(raw.to_string()))
    }
}

impl FromStr for TagId {
    type Err = MarcError;

    fn from_str(s: &str) -> Result<Self> {
        TagId::parse(s)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl From<u32> for TagId {
    fn from(value: u32) -> Self {
        TagId(value)
    }
}

/// How the tags of one record are turned into counter increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagPolicy {
    /// Every distinct tag once, in ascending order
    #[default]
    Distinct,
    /// Document order with consecutive repeats merged
    CollapseRuns,
}

impl TagPolicy {
    /// Extract the tags of `record` under this policy.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::InvalidTag`] for the first tag that is not numeric;
    /// no partial result is produced.
    pub fn extract(self, record: &Record) -> Result<Vec<TagId>> {
        match self {
            TagPolicy::Distinct => Ok(distinct_tags(record)?.into_iter().collect()),
            TagPolicy::CollapseRuns => {
                let mut tags: Vec<TagId> = Vec::with_capacity(record.len());
                for raw in record.tags() {
                    let tag = TagId::parse(raw)?;
                    if tags.last() != Some(&tag) {
                        tags.push(tag);
                    }
                }
                Ok(tags)
            },
        }
    }

    /// Short name used on the command line and in reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            TagPolicy::Distinct => "distinct",
            TagPolicy::CollapseRuns => "collapse-runs",
        }
    }
}

impl fmt::Display for TagPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of tags a record uses.
///
/// # Errors
///
/// Returns [`MarcError::InvalidTag`] if any tag is not numeric.
pub fn distinct_tags(record: &Record) -> Result<BTreeSet<TagId>> {
    record.tags().map(TagId::parse).collect()
}
