//! Ordered tag lists for coverage analysis.
//!
//! A tag-order file lists one tag per line, most important first. Lines
//! starting with `#` are comments, and only the first whitespace-separated
//! token of a line is read, so annotations can follow the tag:
//!
//! ```text
//! # tag  name
//! 245    Title Statement
//! 100    Main Entry--Personal Name
//! 650    Subject Added Entry--Topical Term
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{MarcError, Result};
use crate::tag::TagId;

/// A ranked list of distinct tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagOrder {
    tags: Vec<TagId>,
    #[serde(skip)]
    positions: HashMap<TagId, usize>,
}

impl TagOrder {
    /// Build an order from a list of tags.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::TagOrder`] naming the 1-based entry of the first
    /// repeated tag.
    pub fn new(tags: Vec<TagId>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(tags.len());
        for (index, &tag) in tags.iter().enumerate() {
            if let Some(first) = positions.insert(tag, index) {
                return Err(MarcError::TagOrder {
                    line: index + 1,
                    message: format!("tag {tag} already listed at entry {}", first + 1),
                });
            }
        }
        Ok(TagOrder { tags, positions })
    }

    /// Number of tags in the order.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Returns true if the order lists no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// The tags in rank order.
    #[must_use]
    pub fn as_slice(&self) -> &[TagId] {
        &self.tags
    }

    /// Iterate over the tags in rank order.
    pub fn iter(&self) -> impl Iterator<Item = TagId> + '_ {
        self.tags.iter().copied()
    }

    /// Zero-based rank of `tag`, if listed.
    #[must_use]
    pub fn position(&self, tag: TagId) -> Option<usize> {
        self.positions.get(&tag).copied()
    }

    /// Returns true if `tag` is listed.
    #[must_use]
    pub fn contains(&self, tag: TagId) -> bool {
        self.positions.contains_key(&tag)
    }

    /// Length of the shortest prefix of the order that contains every tag in
    /// `tags`.
    ///
    /// A record without tags is covered by the one-tag prefix. Returns `None`
    /// when some tag is not listed at all, or when the order is empty.
    #[must_use]
    pub fn covering_prefix(&self, tags: &BTreeSet<TagId>) -> Option<usize> {
        if self.tags.is_empty() {
            return None;
        }
        let mut deepest = 0;
        for &tag in tags {
            deepest = deepest.max(self.position(tag)?);
        }
        Some(deepest + 1)
    }
}

/// Read a tag order from a line-oriented source.
///
/// Comment lines (first character `#`) and blank lines are skipped. The first
/// token of every other line must be a numeric tag.
///
/// # Errors
///
/// Returns [`MarcError::TagOrder`] for a non-numeric or repeated tag, and
/// [`MarcError::IoError`] if the source cannot be read.
pub fn read_tag_order<R: BufRead>(source: R) -> Result<TagOrder> {
    let mut tags = Vec::new();
    let mut seen: HashMap<TagId, usize> = HashMap::new();
    for (index, line) in source.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.starts_with('#') {
            continue;
        }
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let tag = TagId::parse(token).map_err(|_| MarcError::TagOrder {
            line: line_no,
            message: format!("{token:?} is not a numeric tag"),
        })?;
        if let Some(first) = seen.insert(tag, line_no) {
            return Err(MarcError::TagOrder {
                line: line_no,
                message: format!("tag {tag} already listed on line {first}"),
            });
        }
        tags.push(tag);
    }
    TagOrder::new(tags)
}

/// Read a tag order from a file and log a summary of it.
///
/// # Errors
///
/// Returns [`MarcError::Source`] naming `path` if the file cannot be opened or
/// parsed.
pub fn read_tag_order_file(path: &Path) -> Result<TagOrder> {
    let file = File::open(path).map_err(|e| MarcError::from(e).in_source(path))?;
    let order = read_tag_order(BufReader::new(file)).map_err(|e| e.in_source(path))?;
    info!(
        "Read a list of {} tags ({})",
        order.len(),
        tag_summary(order.as_slice())
    );
    Ok(order)
}

/// Short printable summary of a tag list.
///
/// Up to four tags are listed in full. Longer lists show the first tag, an
/// ellipsis and the last three.
///
/// ```
/// use marc_stats::stats::tag_summary;
/// use marc_stats::TagId;
///
/// let tags: Vec<TagId> = [1, 8, 245, 650, 700, 856].into_iter().map(TagId::new).collect();
/// assert_eq!(tag_summary(&tags), "001,...,650,700,856");
/// assert_eq!(tag_summary(&tags[..3]), "001,008,245");
/// ```
#[must_use]
pub fn tag_summary(tags: &[TagId]) -> String {
    let shown: Vec<String> = if tags.len() <= 4 {
        tags.iter().map(ToString::to_string).collect()
    } else {
        let tail = &tags[tags.len() - 3..];
        std::iter::once(tags[0].to_string())
            .chain(std::iter::once("...".to_string()))
            .chain(tail.iter().map(ToString::to_string))
            .collect()
    };
    shown.join(",")
}
