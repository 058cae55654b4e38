//! Input path expansion and decompression.
//!
//! Top-level inputs may be files or directories. Directories are walked
//! recursively in name order at every level, so two runs over the same tree
//! see the files in the same order. Files whose name ends in `.gz` are
//! gzip-decompressed on the fly (concatenated gzip members included).
//!
//! Failing to open or walk a path is fatal for the run; every such error names
//! the path through [`MarcError::Source`].

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{MarcError, Result};
use crate::formats::{FormatReader, InputFormat};
use crate::marcxml::MarcXmlReader;
use crate::reader::MarcReader;

/// Expand top-level inputs into the ordered list of files to read.
///
/// # Errors
///
/// Returns [`MarcError::Source`] if an input does not exist or a directory
/// cannot be walked.
pub fn collect_source_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let meta = fs::metadata(input).map_err(|e| MarcError::from(e).in_source(input))?;
        if meta.is_dir() {
            info!("Looking under {}", input.display());
            let walker = WalkDir::new(input).follow_links(true).sort_by_file_name();
            for entry in walker {
                let entry = entry.map_err(|e| {
                    let path = e.path().map_or_else(|| input.clone(), Path::to_path_buf);
                    MarcError::from(io::Error::from(e)).in_source(path)
                })?;
                if entry.file_type().is_file() {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    debug!(count = files.len(), "source files collected");
    Ok(files)
}

/// Returns true if the file name marks gzip-compressed content.
#[must_use]
pub fn is_compressed(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// A buffered byte stream over one input file, decompressed when needed.
pub struct SourceStream {
    path: PathBuf,
    compressed: bool,
    inner: Box<dyn BufRead>,
}

impl std::fmt::Debug for SourceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceStream")
            .field("path", &self.path)
            .field("compressed", &self.compressed)
            .finish_non_exhaustive()
    }
}

impl SourceStream {
    /// Open `path`, decompressing if its name ends in `.gz`.
    ///
    /// # Errors
    ///
    /// Returns [`MarcError::Source`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| MarcError::from(e).in_source(path))?;
        let compressed = is_compressed(path);
        let inner: Box<dyn BufRead> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file))))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(SourceStream {
            path: path.to_path_buf(),
            compressed,
            inner,
        })
    }

    /// The path this stream reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the stream is being decompressed.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }
}

impl Read for SourceStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for SourceStream {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt);
    }
}

/// Open a record reader for one file.
///
/// With `format` unset the format is detected from the file name.
///
/// # Errors
///
/// Returns [`MarcError::Source`] if the file cannot be opened.
pub fn open_reader(path: &Path, format: Option<InputFormat>) -> Result<Box<dyn FormatReader>> {
    let format = format.unwrap_or_else(|| InputFormat::detect(path));
    let stream = SourceStream::open(path)?;
    debug!(path = %path.display(), %format, compressed = stream.is_compressed(), "opened source");
    Ok(match format {
        InputFormat::MarcXml => Box::new(MarcXmlReader::new(stream)),
        InputFormat::Iso2709 => Box::new(MarcReader::new(stream)),
    })
}
