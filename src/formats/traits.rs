//! Format reader trait for MARC records.
//!
//! Every record source (MARCXML, ISO 2709) implements [`FormatReader`], so the
//! accumulators can fold records without knowing where they came from.
//!
//! # Error contract
//!
//! A reader that returns an error for which
//! [`MarcError::is_record_error`](crate::MarcError::is_record_error) is true has
//! consumed the offending record and can be asked for the next one. Any other
//! error leaves the stream unusable.
//!
//! # Example
//!
//! ```ignore
//! use marc_stats::formats::FormatReader;
//!
//! fn count_records<R: FormatReader>(reader: &mut R) -> marc_stats::Result<usize> {
//!     let mut count = 0;
//!     while reader.read_record()?.is_some() {
//!         count += 1;
//!     }
//!     Ok(count)
//! }
//! ```

use crate::error::Result;
use crate::record::Record;

/// Trait for readers that can produce MARC records from a source.
pub trait FormatReader: std::fmt::Debug {
    /// Read the next record from the source.
    ///
    /// Returns:
    /// - `Ok(Some(record))` if a record was read successfully
    /// - `Ok(None)` if the end of the source was reached
    /// - `Err(_)` if reading failed due to malformed data or I/O errors
    ///
    /// # Errors
    ///
    /// Returns an error if the source contains malformed data or I/O fails.
    fn read_record(&mut self) -> Result<Option<Record>>;

    /// Read all remaining records into a vector.
    ///
    /// For large files, prefer streaming with `read_record` to avoid memory
    /// pressure.
    ///
    /// # Errors
    ///
    /// Returns an error if any record fails to read. On error, previously
    /// read records are discarded.
    fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Returns the number of records read so far, malformed ones included.
    ///
    /// The default implementation returns `None` if tracking is not supported.
    fn records_read(&self) -> Option<usize> {
        None
    }
}

impl<R: FormatReader + ?Sized> FormatReader for Box<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        (**self).read_record()
    }

    fn records_read(&self) -> Option<usize> {
        (**self).records_read()
    }
}

/// Extension trait providing iterator-style access for format readers.
///
/// This trait is automatically implemented for all types implementing [`FormatReader`].
pub trait FormatReaderExt: FormatReader {
    /// Create an iterator over records from this reader.
    ///
    /// The iterator yields `Result<Record>` for each record. It stops after the
    /// first error that is not a record-level error.
    fn records(&mut self) -> RecordIterator<'_, Self>
    where
        Self: Sized,
    {
        RecordIterator {
            reader: self,
            done: false,
        }
    }
}

impl<T: FormatReader> FormatReaderExt for T {}

/// Iterator adapter for [`FormatReader`].
///
/// Created by the [`records`](FormatReaderExt::records) method.
#[derive(Debug)]
pub struct RecordIterator<'a, R: FormatReader> {
    reader: &'a mut R,
    done: bool,
}

impl<R: FormatReader> Iterator for RecordIterator<'_, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = !e.is_record_error();
                Some(Err(e))
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::MarcError;

    /// Mock reader replaying a fixed script of results.
    #[derive(Debug)]
    pub(crate) struct MockReader {
        script: std::vec::IntoIter<Result<Record>>,
        read: usize,
    }

    impl MockReader {
        pub(crate) fn new(script: Vec<Result<Record>>) -> Self {
            Self {
                script: script.into_iter(),
                read: 0,
            }
        }
    }

    impl FormatReader for MockReader {
        fn read_record(&mut self) -> Result<Option<Record>> {
            match self.script.next() {
                Some(Ok(record)) => {
                    self.read += 1;
                    Ok(Some(record))
                },
                Some(Err(e)) => {
                    self.read += 1;
                    Err(e)
                },
                None => Ok(None),
            }
        }

        fn records_read(&self) -> Option<usize> {
            Some(self.read)
        }
    }

    #[test]
    fn test_read_all() {
        let mut reader = MockReader::new(vec![Ok(Record::new()), Ok(Record::new())]);
        let records = reader.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(reader.records_read(), Some(2));
    }

    #[test]
    fn test_iterator_continues_after_record_error() {
        let mut reader = MockReader::new(vec![
            Ok(Record::new()),
            Err(MarcError::InvalidField("missing tag".into())),
            Ok(Record::new()),
        ]);
        let results: Vec<_> = reader.records().collect();
        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_iterator_stops_after_stream_error() {
        let mut reader = MockReader::new(vec![
            Err(MarcError::ParseError("broken".into())),
            Ok(Record::new()),
        ]);
        let results: Vec<_> = reader.records().collect();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_boxed_reader_delegates() {
        let mut reader: Box<dyn FormatReader> = Box::new(MockReader::new(vec![Ok(Record::new())]));
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.records_read(), Some(1));
    }
}
