//! Statistics accumulators over record streams.
//!
//! Two accumulators are provided:
//!
//! - [`UsageStats`]: how many records use each tag
//! - [`CoverageStats`]: how much of the collection a growing prefix of a
//!   ranked [`TagOrder`] covers
//!
//! Both implement [`Accumulator`], which folds records one at a time and
//! supplies the file and directory plumbing. A record that cannot be analyzed
//! (a reader-level record error or a non-numeric tag) is counted as bad and
//! never touches the counters. Errors that break the input stream end the run.
//!
//! # Examples
//!
//! ```
//! use marc_stats::formats::FormatReader;
//! use marc_stats::marcxml::MarcXmlReader;
//! use marc_stats::stats::{Accumulator, UsageStats};
//! use marc_stats::TagId;
//!
//! let xml = r#"<collection>
//!   <record><controlfield tag="001">1</controlfield><datafield tag="245"/></record>
//!   <record><datafield tag="24X"/></record>
//! </collection>"#;
//!
//! let mut stats = UsageStats::new();
//! let mut reader = MarcXmlReader::new(xml.as_bytes());
//! stats.add_records(&mut reader).unwrap();
//!
//! assert_eq!(stats.num_records(), 1);
//! assert_eq!(stats.num_bad(), 1);
//! assert_eq!(stats.count(TagId::new(245)), 1);
//! ```

mod coverage;
mod tag_order;
mod usage;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MarcError, Result};
use crate::formats::{FormatReader, InputFormat};
use crate::record::Record;
use crate::source::{collect_source_files, open_reader};

pub use coverage::CoverageStats;
pub use tag_order::{read_tag_order, read_tag_order_file, tag_summary, TagOrder};
pub use usage::UsageStats;

/// What an accumulator did with one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// The record was counted.
    Counted,
    /// The record was counted but falls outside every coverage bucket.
    Uncovered,
    /// The record could not be analyzed and was counted as bad.
    Bad(MarcError),
}

impl RecordOutcome {
    /// Returns true for [`RecordOutcome::Bad`].
    #[must_use]
    pub fn is_bad(&self) -> bool {
        matches!(self, RecordOutcome::Bad(_))
    }
}

/// A fold over MARC records.
pub trait Accumulator {
    /// Fold one parsed record into the statistics.
    fn add(&mut self, record: &Record) -> RecordOutcome;

    /// Count a record the reader could not parse.
    fn mark_bad(&mut self, error: &MarcError);

    /// Records successfully analyzed.
    fn num_records(&self) -> u64;

    /// Records skipped as malformed.
    fn num_bad(&self) -> u64;

    /// Fold every record from `reader`.
    ///
    /// Record-level reader errors are counted as bad and reading continues.
    ///
    /// # Errors
    ///
    /// Returns the first error that leaves the reader unusable. Records folded
    /// before it stay counted.
    fn add_records<R: FormatReader + ?Sized>(&mut self, reader: &mut R) -> Result<()>
    where
        Self: Sized,
    {
        loop {
            match reader.read_record() {
                Ok(Some(record)) => {
                    if let RecordOutcome::Bad(err) = self.add(&record) {
                        debug!(
                            control_number = record.control_number().unwrap_or("-"),
                            error = %err,
                            "ignoring bad record"
                        );
                    }
                },
                Ok(None) => return Ok(()),
                Err(err) if err.is_record_error() => {
                    debug!(error = %err, "ignoring malformed record");
                    self.mark_bad(&err);
                },
                Err(err) => return Err(err),
            }
        }
    }

    /// Fold every record in one file.
    ///
    /// With `format` unset the format is detected from the file name.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Source`] naming `path` if the file cannot be
    /// opened or its stream breaks.
    fn add_records_from_file(&mut self, path: &Path, format: Option<InputFormat>) -> Result<()>
    where
        Self: Sized,
    {
        let mut reader = open_reader(path, format)?;
        self.add_records(&mut reader).map_err(|e| e.in_source(path))?;
        info!("[{} records...]", self.num_records());
        Ok(())
    }
}

/// Fold every file named by `inputs` into `acc`.
///
/// Directories are expanded recursively in name order. Returns the number of
/// files read.
///
/// # Errors
///
/// Stops at the first fatal error, leaving `acc` holding everything folded so
/// far.
pub fn accumulate_paths<A: Accumulator>(
    acc: &mut A,
    inputs: &[PathBuf],
    format: Option<InputFormat>,
) -> Result<usize> {
    let files = collect_source_files(inputs)?;
    for path in &files {
        info!("Reading {}", path.display());
        acc.add_records_from_file(path, format)?;
    }
    Ok(files.len())
}
