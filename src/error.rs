//! Error types for record reading and statistics accumulation.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type.
//!
//! Errors fall into two classes. Record-level errors (see
//! [`MarcError::is_record_error`]) describe a single malformed record: the
//! reader that produced one is still positioned at the next record, and the
//! accumulators count it as bad and carry on. Every other variant ends the run.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for all library operations.
#[derive(Error, Debug)]
pub enum MarcError {
    /// Error indicating an invalid or malformed MARC record.
    #[error("Invalid MARC record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid leader (24-byte header).
    #[error("Invalid leader: {0}")]
    InvalidLeader(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A field tag that cannot be read as an integer tag id.
    #[error("Invalid tag: {0:?} is not a numeric field tag")]
    InvalidTag(String),

    /// Error indicating a truncated or incomplete record.
    #[error("Truncated record: {0}")]
    TruncatedRecord(String),

    /// The input stream itself could not be parsed (XML or RDF syntax).
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A malformed tag-order list.
    #[error("Tag order line {line}: {message}")]
    TagOrder {
        /// 1-based line number in the tag-order source.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Failure while reading a specific input path.
    #[error("{}: {source}", path.display())]
    Source {
        /// The path being read.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: Box<MarcError>,
    },

    /// IO error from the underlying source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MarcError {
    /// Returns true if the error concerns one record only and reading may
    /// continue with the next record.
    #[must_use]
    pub fn is_record_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRecord(_)
                | Self::InvalidField(_)
                | Self::InvalidTag(_)
                | Self::TruncatedRecord(_)
        )
    }

    /// Attach the path being read to an error.
    ///
    /// Errors that already name a path are returned unchanged.
    #[must_use]
    pub fn in_source(self, path: impl Into<PathBuf>) -> Self {
        match self {
            err @ Self::Source { .. } => err,
            other => Self::Source {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors_are_classified() {
        assert!(MarcError::InvalidTag("ABC".into()).is_record_error());
        assert!(MarcError::InvalidField("no tag".into()).is_record_error());
        assert!(MarcError::TruncatedRecord("eof".into()).is_record_error());
        assert!(!MarcError::ParseError("bad xml".into()).is_record_error());
        assert!(!MarcError::InvalidLeader("bad length".into()).is_record_error());
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!MarcError::IoError(io).is_record_error());
    }

    #[test]
    fn test_source_error_names_path() {
        let err = MarcError::ParseError("unexpected end".into()).in_source("data/a.xml");
        assert_eq!(err.to_string(), "data/a.xml: Parse error: unexpected end");

        // Wrapping twice keeps the innermost path.
        let err = err.in_source("other.xml");
        assert!(err.to_string().starts_with("data/a.xml"));
    }
}
