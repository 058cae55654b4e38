#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # marc-stats: MARC tag statistics
//!
//! Streaming statistics over large MARC collections: how often each field tag
//! is used, and how much of a collection a ranked list of tags covers. A
//! companion extractor pulls concepts and labels out of SKOS vocabulary dumps.
//!
//! ## Quick Start
//!
//! ```
//! use marc_stats::marcxml::MarcXmlReader;
//! use marc_stats::stats::{Accumulator, UsageStats};
//!
//! let xml = r#"<collection xmlns="http://www.loc.gov/MARC21/slim">
//!   <record>
//!     <controlfield tag="001">ocm0001</controlfield>
//!     <datafield tag="245" ind1="1" ind2="0"><subfield code="a">Title</subfield></datafield>
//!   </record>
//! </collection>"#;
//!
//! let mut stats = UsageStats::new();
//! stats.add_records(&mut MarcXmlReader::new(xml.as_bytes()))?;
//! print!("{}", stats.report());
//! # Ok::<(), marc_stats::MarcError>(())
//! ```
//!
//! ## Modules
//!
//! - [`record`] — In-memory records (`Record`, `Field`, `Subfield`)
//! - [`marcxml`] — Streaming MARCXML reader
//! - [`reader`] — ISO 2709 reader
//! - [`formats`] — The [`FormatReader`](formats::FormatReader) trait and format detection
//! - [`source`] — Directory expansion and gzip decompression
//! - [`tag`] — Numeric tag ids and extraction policies
//! - [`stats`] — Usage and coverage accumulators
//! - [`report`] — Text and JSON reports
//! - [`vocab`] — SKOS concept and label extraction from N-Triples
//! - [`bsr`] — Tag mentions in BSR documentation
//! - [`config`] — Tool configuration
//! - [`error`] — Error types

pub mod bsr;
pub mod config;
pub mod error;
pub mod formats;
pub mod leader;
pub mod marcxml;
pub mod reader;
pub mod record;
pub mod report;
pub mod source;
pub mod stats;
pub mod tag;
pub mod vocab;

pub use error::{MarcError, Result};
pub use leader::Leader;
pub use marcxml::MarcXmlReader;
pub use reader::MarcReader;
pub use record::{Field, FieldBuilder, Record, RecordBuilder, Subfield};
pub use report::{CoverageReport, UsageReport};
pub use stats::{Accumulator, CoverageStats, TagOrder, UsageStats};
pub use tag::{TagId, TagPolicy};
