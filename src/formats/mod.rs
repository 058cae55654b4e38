//! Input format support for MARC records.
//!
//! All record sources implement [`FormatReader`], allowing format-agnostic
//! accumulation.
//!
//! # Supported Formats
//!
//! | Format | Reader | Description |
//! |--------|--------|-------------|
//! | MARCXML | [`MarcXmlReader`](crate::marcxml::MarcXmlReader) | LOC MARC21 slim XML (default) |
//! | ISO 2709 | [`MarcReader`](crate::reader::MarcReader) | Standard MARC interchange format |
//!
//! # Format Detection
//!
//! ```
//! use marc_stats::formats::InputFormat;
//! use std::path::Path;
//!
//! assert_eq!(InputFormat::detect(Path::new("books.mrc.gz")), InputFormat::Iso2709);
//! assert_eq!(InputFormat::detect(Path::new("books.xml")), InputFormat::MarcXml);
//! ```

mod traits;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use traits::{FormatReader, FormatReaderExt, RecordIterator};

#[cfg(test)]
pub(crate) use traits::tests::MockReader;

/// Serialization of the records inside an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputFormat {
    /// MARCXML (`<collection>` of `<record>` elements)
    #[default]
    MarcXml,
    /// ISO 2709 binary MARC format (`.mrc`, `.marc`, `.iso`)
    Iso2709,
}

impl InputFormat {
    /// Detect format from a file extension.
    ///
    /// Returns `None` if the extension is not recognized.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mrc" | "marc" | "iso" => Some(Self::Iso2709),
            "xml" | "marcxml" => Some(Self::MarcXml),
            _ => None,
        }
    }

    /// Detect format from a path, looking through a trailing `.gz`.
    ///
    /// Unrecognized extensions are read as MARCXML.
    #[must_use]
    pub fn detect(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        Path::new(name)
            .extension()
            .and_then(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Get the human-readable name for this format.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MarcXml => "MARCXML",
            Self::Iso2709 => "ISO 2709",
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
