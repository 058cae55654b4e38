//! Run configuration for the statistics and extraction tools.
//!
//! Each tool has a config struct whose `Default` matches the command-line
//! defaults, and a `run` method doing the work and returning a printable,
//! serializable result.

use std::fmt;
use std::io::{self, BufReader};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bsr::{extract_bsr_tags, BsrTags};
use crate::error::{MarcError, Result};
use crate::formats::InputFormat;
use crate::report::{CoverageReport, UsageReport};
use crate::stats::{accumulate_paths, read_tag_order_file, Accumulator, CoverageStats, UsageStats};
use crate::tag::TagPolicy;
use crate::vocab::{extract_concepts_from_file, Extraction};

/// Default tag-order list for coverage analysis.
pub const DEFAULT_ORDER_LIST: &str = "marc_tag_order.dat";

/// Default LCSH SKOS dump.
pub const DEFAULT_LCSH_SKOS: &str = "authoritiessubjects.skos.nt";

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

impl OutputFormat {
    /// Render `value` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render<T: fmt::Display + Serialize>(self, value: &T) -> serde_json::Result<String> {
        match self {
            Self::Text => Ok(value.to_string()),
            Self::Json => serde_json::to_string_pretty(value).map(|mut s| {
                s.push('\n');
                s
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Tag usage over a set of inputs.
#[derive(Debug, Clone, Default)]
pub struct TagUseConfig {
    /// Files or directories to read
    pub inputs: Vec<PathBuf>,
    /// Record format; detected per file when unset
    pub format: Option<InputFormat>,
    /// Tag extraction policy
    pub policy: TagPolicy,
}

impl TagUseConfig {
    /// Accumulate usage over every input.
    ///
    /// # Errors
    ///
    /// Returns the first fatal input error.
    pub fn run(&self) -> Result<UsageReport> {
        let mut stats = UsageStats::with_policy(self.policy);
        let files = accumulate_paths(&mut stats, &self.inputs, self.format)?;
        info!(files, records = stats.num_records(), "tag usage complete");
        Ok(stats.report())
    }
}

/// Tag-order coverage over a set of inputs.
#[derive(Debug, Clone)]
pub struct CoverageConfig {
    /// Files or directories to read
    pub inputs: Vec<PathBuf>,
    /// Record format; detected per file when unset
    pub format: Option<InputFormat>,
    /// Tag-order list file
    pub order_list: PathBuf,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        CoverageConfig {
            inputs: Vec::new(),
            format: None,
            order_list: PathBuf::from(DEFAULT_ORDER_LIST),
        }
    }
}

impl CoverageConfig {
    /// Read the tag order, then accumulate coverage over every input.
    ///
    /// # Errors
    ///
    /// Returns an error if the tag order cannot be read or an input fails.
    pub fn run(&self) -> Result<CoverageReport> {
        let order = read_tag_order_file(&self.order_list)?;
        let mut stats = CoverageStats::new(order);
        let files = accumulate_paths(&mut stats, &self.inputs, self.format)?;
        info!(files, records = stats.num_records(), "coverage complete");
        Ok(stats.report())
    }
}

/// SKOS concept and label extraction.
#[derive(Debug, Clone)]
pub struct LabelConfig {
    /// N-Triples dump, optionally gzipped
    pub skos: PathBuf,
    /// Stop after this many statements pass the filter
    pub stop_after: Option<usize>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            skos: PathBuf::from(DEFAULT_LCSH_SKOS),
            stop_after: None,
        }
    }
}

impl LabelConfig {
    /// Extract concepts and labels from the dump.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump cannot be read.
    pub fn run(&self) -> Result<Extraction> {
        info!("Reading {}", self.skos.display());
        extract_concepts_from_file(&self.skos, self.stop_after)
    }
}

/// BSR tag extraction.
#[derive(Debug, Clone, Default)]
pub struct BsrConfig {
    /// Text file to read; standard input when unset
    pub input: Option<PathBuf>,
}

impl BsrConfig {
    /// Extract tag mentions from the input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    pub fn run(&self) -> Result<BsrTags> {
        match &self.input {
            Some(path) => {
                let file =
                    std::fs::File::open(path).map_err(|e| MarcError::from(e).in_source(path))?;
                extract_bsr_tags(BufReader::new(file)).map_err(|e| e.in_source(path))
            },
            None => extract_bsr_tags(io::stdin().lock()),
        }
    }
}
