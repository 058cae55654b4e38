//! Streaming MARCXML reader.
//!
//! This module reads records in the Library of Congress MARCXML format
//! (<https://www.loc.gov/standards/marcxml/>) one `<record>` at a time, so a
//! multi-gigabyte `<collection>` never has to fit in memory.
//!
//! Both default-namespace (`<record xmlns="...">`) and prefix-namespace
//! (`<marc:record xmlns:marc="...">`) forms are accepted, as is a document
//! with no namespace at all. Records may be wrapped in a `<collection>` or
//! appear at the top level.
//!
//! A record whose XML is well-formed but whose MARC structure is not (a
//! `datafield` without a `tag`, a `subfield` without a `code`) produces a
//! record-level error after the whole `<record>` element has been consumed.
//! XML syntax errors are fatal for the stream, and so is a document that ends
//! while an element is still open.
//!
//! # Examples
//!
//! ```
//! use marc_stats::marcxml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <leader>01142cam  2200301 a 4500</leader>
//!     <controlfield tag="001">92005291</controlfield>
//!     <datafield tag="245" ind1="1" ind2="0">
//!       <subfield code="a">Introduction to algorithms /</subfield>
//!     </datafield>
//!   </record>
//! </collection>"#;
//!
//! let records = marcxml::marcxml_to_records(xml)?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].control_number(), Some("92005291"));
//! # Ok(())
//! # }
//! ```

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{MarcError, Result};
use crate::formats::FormatReader;
use crate::leader::Leader;
use crate::record::{Field, Record};

/// The MARCXML namespace URI.
pub const MARCXML_NS: &str = "http://www.loc.gov/MARC21/slim";

/// Reader for MARCXML documents.
pub struct MarcXmlReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    records_read: usize,
    exhausted: bool,
    // Elements open outside any record, such as `<collection>`.
    depth: usize,
}

impl<R: BufRead> std::fmt::Debug for MarcXmlReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarcXmlReader")
            .field("position", &self.reader.buffer_position())
            .field("records_read", &self.records_read)
            .field("exhausted", &self.exhausted)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

/// The element whose text is currently being collected.
#[derive(Debug)]
enum Open {
    Leader,
    ControlField(String),
    Subfield(char),
}

/// Accumulates one `<record>` element.
#[derive(Debug, Default)]
struct RecordState {
    record: Record,
    datafield: Option<Field>,
    open: Option<Open>,
    text: String,
    problem: Option<MarcError>,
}

impl RecordState {
    fn fail(&mut self, error: MarcError) {
        if self.problem.is_none() {
            self.problem = Some(error);
        }
    }

    fn start(&mut self, element: &BytesStart<'_>) {
        let result = match element.local_name().as_ref() {
            b"leader" => {
                self.open_text(Open::Leader);
                Ok(())
            },
            b"controlfield" => attr_value(element, b"tag").and_then(|tag| {
                let tag = tag.ok_or_else(|| {
                    MarcError::InvalidField("controlfield without tag attribute".to_string())
                })?;
                self.open_text(Open::ControlField(tag));
                Ok(())
            }),
            b"datafield" => self.start_datafield(element),
            b"subfield" => attr_value(element, b"code").and_then(|code| {
                let code = code
                    .and_then(|c| c.chars().next())
                    .ok_or_else(|| MarcError::InvalidField("Missing subfield code".to_string()))?;
                self.open_text(Open::Subfield(code));
                Ok(())
            }),
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.fail(e);
        }
    }

    fn start_datafield(&mut self, element: &BytesStart<'_>) -> Result<()> {
        let tag = attr_value(element, b"tag")?
            .ok_or_else(|| MarcError::InvalidField("datafield without tag attribute".to_string()))?;
        let ind1 = attr_value(element, b"ind1")?.and_then(|v| v.chars().next());
        let ind2 = attr_value(element, b"ind2")?.and_then(|v| v.chars().next());
        self.datafield = Some(Field::new(tag, ind1.unwrap_or(' '), ind2.unwrap_or(' ')));
        Ok(())
    }

    fn open_text(&mut self, open: Open) {
        self.open = Some(open);
        self.text.clear();
    }

    fn end(&mut self, local_name: &[u8]) {
        match local_name {
            b"leader" | b"controlfield" | b"subfield" => {
                let text = std::mem::take(&mut self.text);
                match self.open.take() {
                    Some(Open::Leader) => self.record.leader = Leader::from_bytes(text.as_bytes()).ok(),
                    Some(Open::ControlField(tag)) => self.record.add_control_field(tag, text),
                    Some(Open::Subfield(code)) => {
                        if let Some(field) = self.datafield.as_mut() {
                            field.add_subfield(code, text);
                        }
                    },
                    None => {},
                }
            },
            b"datafield" => {
                if let Some(field) = self.datafield.take() {
                    self.record.add_field(field);
                }
            },
            _ => {},
        }
    }

    fn finish(self) -> Result<Record> {
        match self.problem {
            Some(problem) => Err(problem),
            None => Ok(self.record),
        }
    }
}

impl<R: BufRead> MarcXmlReader<R> {
    /// Create a new MARCXML reader over a buffered source.
    pub fn new(source: R) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.expand_empty_elements(true);
        MarcXmlReader {
            reader,
            buf: Vec::new(),
            records_read: 0,
            exhausted: false,
            depth: 0,
        }
    }

    /// Read the next `<record>` element.
    ///
    /// # Errors
    ///
    /// Returns a record-level error for a structurally invalid record, and a
    /// fatal [`MarcError::ParseError`] or [`MarcError::IoError`] if the XML
    /// itself cannot be read or the document ends with elements still open.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if self.exhausted {
            return Ok(None);
        }

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    self.exhausted = true;
                    return Err(xml_error(&e, self.reader.buffer_position()));
                },
            };
            match event {
                Event::Start(e) if e.local_name().as_ref() == b"record" => break,
                Event::Start(_) => self.depth += 1,
                Event::End(_) => self.depth = self.depth.saturating_sub(1),
                Event::Eof => {
                    self.exhausted = true;
                    if self.depth > 0 {
                        return Err(unexpected_eof(self.reader.buffer_position()));
                    }
                    return Ok(None);
                },
                _ => {},
            }
        }

        self.records_read += 1;
        self.read_record_body().map(Some)
    }

    /// Consume events up to and including the `</record>` that closes the
    /// record just opened.
    fn read_record_body(&mut self) -> Result<Record> {
        let mut state = RecordState::default();

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    self.exhausted = true;
                    return Err(xml_error(&e, self.reader.buffer_position()));
                },
            };
            match event {
                Event::Start(e) => state.start(&e),
                Event::End(e) => {
                    let name = e.local_name();
                    if name.as_ref() == b"record" {
                        return state.finish();
                    }
                    state.end(name.as_ref());
                },
                Event::Text(t) if state.open.is_some() => match t.unescape() {
                    Ok(text) => state.text.push_str(&text),
                    Err(e) => state.fail(MarcError::InvalidField(format!("Malformed text: {e}"))),
                },
                Event::CData(c) if state.open.is_some() => {
                    state.text.push_str(&String::from_utf8_lossy(&c));
                },
                Event::Eof => {
                    self.exhausted = true;
                    return Err(unexpected_eof(self.reader.buffer_position()));
                },
                _ => {},
            }
        }
    }
}

impl<R: BufRead> FormatReader for MarcXmlReader<R> {
    fn read_record(&mut self) -> Result<Option<Record>> {
        MarcXmlReader::read_record(self)
    }

    fn records_read(&self) -> Option<usize> {
        Some(self.records_read)
    }
}

/// Look up an attribute by local name.
fn attr_value(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr =
            attr.map_err(|e| MarcError::InvalidField(format!("Malformed attribute: {e}")))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| MarcError::InvalidField(format!("Malformed attribute value: {e}")))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn xml_error(err: &quick_xml::Error, position: usize) -> MarcError {
    match err {
        quick_xml::Error::Io(io) => {
            MarcError::IoError(std::io::Error::new(io.kind(), io.to_string()))
        },
        other => MarcError::ParseError(format!("Malformed XML near byte {position}: {other}")),
    }
}

fn unexpected_eof(position: usize) -> MarcError {
    MarcError::ParseError(format!(
        "Document ends at byte {position} with elements still open"
    ))
}

/// Convert a MARCXML string holding a single record to a [`Record`].
///
/// # Errors
///
/// Returns an error if the XML is invalid or holds no record.
pub fn marcxml_to_record(xml: &str) -> Result<Record> {
    MarcXmlReader::new(xml.as_bytes())
        .read_record()?
        .ok_or_else(|| MarcError::ParseError("No <record> element found".to_string()))
}

/// Convert a MARCXML `<collection>` string to multiple records.
///
/// # Errors
///
/// Returns an error if the XML is invalid or any record is malformed.
pub fn marcxml_to_records(xml: &str) -> Result<Vec<Record>> {
    MarcXmlReader::new(xml.as_bytes()).read_all()
}
