//! Reading MARC records from ISO 2709 binary streams.
//!
//! This module provides [`MarcReader`] for reading ISO 2709 formatted MARC records
//! from any source that implements [`std::io::Read`].
//!
//! Each record is read in full (the leader says how long it is) before its
//! directory is parsed, so a record with a broken directory or field only costs
//! that record: the error is record-level and the next call starts at the next
//! record. A leader that cannot be parsed leaves no way to find the next record
//! and is fatal for the stream.
//!
//! # Examples
//!
//! ```no_run
//! use marc_stats::MarcReader;
//! use std::fs::File;
//!
//! let file = File::open("records.mrc")?;
//! let mut reader = MarcReader::new(file);
//!
//! while let Some(record) = reader.read_record()? {
//!     println!("{} fields", record.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::{MarcError, Result};
use crate::formats::FormatReader;
use crate::leader::{Leader, LEADER_LEN};
use crate::record::{Field, Record};
use std::io::{ErrorKind, Read};

const FIELD_TERMINATOR: u8 = 0x1E;
const SUBFIELD_DELIMITER: u8 = 0x1F;
const DIRECTORY_ENTRY_LEN: usize = 12;

/// Reader for ISO 2709 binary MARC format.
#[derive(Debug)]
pub struct MarcReader<R: Read> {
    reader: R,
    records_read: usize,
    exhausted: bool,
}

impl<R: Read> MarcReader<R> {
    /// Create a new MARC reader.
    pub fn new(reader: R) -> Self {
        MarcReader {
            reader,
            records_read: 0,
            exhausted: false,
        }
    }

    /// Read a single MARC record.
    ///
    /// Returns `Ok(Some(record))` if a record was successfully read, `Ok(None)` if EOF
    /// was reached, or `Err` if a parsing error occurred.
    ///
    /// # Errors
    ///
    /// Returns a record-level error if:
    /// - The directory or a field of the record is malformed
    /// - The stream ends in the middle of a record (the stream then reports EOF)
    ///
    /// Returns a fatal error if the leader is malformed or an I/O error occurs.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.exhausted {
            return Ok(None);
        }

        let mut leader_bytes = [0u8; LEADER_LEN];
        let filled = self.read_full(&mut leader_bytes)?;
        if filled == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        if filled < LEADER_LEN {
            self.exhausted = true;
            self.records_read += 1;
            return Err(MarcError::TruncatedRecord(format!(
                "Unexpected end of file after {filled} leader bytes"
            )));
        }

        let leader = Leader::from_bytes(&leader_bytes).and_then(|leader| {
            leader.validate_for_reading()?;
            Ok(leader)
        });
        let leader = match leader {
            Ok(leader) => leader,
            Err(e) => {
                self.exhausted = true;
                return Err(e);
            },
        };

        let mut record_data = vec![0u8; leader.record_length as usize - LEADER_LEN];
        let filled = self.read_full(&mut record_data)?;
        self.records_read += 1;
        if filled < record_data.len() {
            self.exhausted = true;
            return Err(MarcError::TruncatedRecord(
                "Unexpected end of file while reading record data".to_string(),
            ));
        }

        parse_record(leader, &record_data).map(Some)
    }

    /// Fill `buf` as far as the source allows, returning the number of bytes read.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {},
                Err(e) => return Err(MarcError::IoError(e)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read + std::fmt::Debug> FormatReader for MarcReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        MarcReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

/// Parse the directory and fields that follow the leader
fn parse_record(leader: Leader, record_data: &[u8]) -> Result<Record> {
    let base_offset = leader.data_base_address as usize - LEADER_LEN;
    let directory = &record_data[..base_offset];
    let data = &record_data[base_offset..];

    let mut record = Record::with_leader(leader);

    // Directory entries are 12 bytes: tag(3) + length(4) + start position(5)
    let mut pos = 0;
    while pos < directory.len() && directory[pos] != FIELD_TERMINATOR {
        if pos + DIRECTORY_ENTRY_LEN > directory.len() {
            return Err(MarcError::InvalidRecord(
                "Incomplete directory entry".to_string(),
            ));
        }

        let entry = &directory[pos..pos + DIRECTORY_ENTRY_LEN];
        let tag = String::from_utf8_lossy(&entry[0..3]).to_string();
        let field_length = parse_digits(&entry[3..7])?;
        let start_position = parse_digits(&entry[7..12])?;
        pos += DIRECTORY_ENTRY_LEN;

        let end_position = start_position + field_length;
        if end_position > data.len() {
            return Err(MarcError::InvalidRecord(format!(
                "Field {tag} exceeds data area"
            )));
        }
        let field_data = &data[start_position..end_position];

        if is_control_tag(&tag) {
            let value = field_data.strip_suffix(&[FIELD_TERMINATOR]).unwrap_or(field_data);
            record.add_control_field(tag, String::from_utf8_lossy(value).to_string());
        } else {
            let field = parse_data_field(field_data, &tag)
                .map_err(|e| MarcError::InvalidField(format!("Tag {tag}: {e}")))?;
            record.add_field(field);
        }
    }

    Ok(record)
}

/// Control fields are 001-009
fn is_control_tag(tag: &str) -> bool {
    tag.starts_with("00") && tag.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a data field from raw bytes
fn parse_data_field(data: &[u8], tag: &str) -> Result<Field> {
    if data.len() < 2 {
        return Err(MarcError::InvalidField(
            "Data field too short (needs indicators)".to_string(),
        ));
    }

    let mut field = Field::new(tag.to_string(), data[0] as char, data[1] as char);

    let subfield_data = &data[2..];
    let mut current_position = 0;

    while current_position < subfield_data.len() {
        match subfield_data[current_position] {
            FIELD_TERMINATOR => break,
            SUBFIELD_DELIMITER => {
                current_position += 1;
                if current_position >= subfield_data.len() {
                    break;
                }

                let code = subfield_data[current_position] as char;
                current_position += 1;

                let rest = &subfield_data[current_position..];
                let end = memchr::memchr2(SUBFIELD_DELIMITER, FIELD_TERMINATOR, rest)
                    .map_or(subfield_data.len(), |offset| current_position + offset);

                let value = String::from_utf8_lossy(&subfield_data[current_position..end]);
                field.add_subfield(code, value.to_string());
                current_position = end;
            },
            _ => {
                return Err(MarcError::InvalidField(
                    "Expected subfield delimiter".to_string(),
                ));
            },
        }
    }

    Ok(field)
}

/// Parse a fixed-width ASCII number from directory bytes
fn parse_digits(bytes: &[u8]) -> Result<usize> {
    let mut result = 0usize;
    for &byte in bytes {
        if byte.is_ascii_digit() {
            result = result * 10 + (byte - b'0') as usize;
        } else {
            return Err(MarcError::InvalidRecord(format!(
                "Invalid numeric field: expected digits, got byte {}",
                byte as char
            )));
        }
    }
    Ok(result)
}
