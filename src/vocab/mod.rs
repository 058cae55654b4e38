//! SKOS vocabulary extraction.
//!
//! Reads an N-Triples dump of a SKOS vocabulary (such as LC Subject Headings),
//! keeps only concept typing and label statements, and indexes them by
//! subject. The whole dump is never held in memory: statements are filtered
//! as they are parsed.
//!
//! # Examples
//!
//! ```
//! use marc_stats::vocab::extract_concepts;
//!
//! let nt = r#"<http://id.loc.gov/authorities/subjects/sh1> <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> <http://www.w3.org/2004/02/skos/core#Concept> .
//! <http://id.loc.gov/authorities/subjects/sh1> <http://www.w3.org/2004/02/skos/core#prefLabel> "Cats"@en .
//! <http://id.loc.gov/authorities/subjects/sh1> <http://www.w3.org/2004/02/skos/core#changeNote> _:c1 .
//! "#;
//!
//! let extraction = extract_concepts(nt.as_bytes(), None).unwrap();
//! assert_eq!(extraction.index.concept_count(), 1);
//! assert_eq!(extraction.forwarded, 2);
//! ```

mod filter;
pub mod namespaces;
mod rdf;

use std::fmt;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MarcError, Result};
use crate::source::SourceStream;

pub use filter::{FilterSink, StopReached, TriplePattern, TripleFilter};
pub use rdf::{for_each_ntriple, ParseSummary, RdfNode, RdfTriple};

use namespaces::{RDF_TYPE, SKOS_ALT_LABEL, SKOS_CONCEPT, SKOS_PREF_LABEL};

/// Labels and typing collected for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Concept {
    /// Subject URI, or `_:id` for a blank node
    pub uri: String,
    /// Whether the subject is typed `skos:Concept`
    pub is_concept: bool,
    /// Preferred labels, first seen first
    pub pref_labels: Vec<String>,
    /// Alternate labels, first seen first
    pub alt_labels: Vec<String>,
}

impl Concept {
    /// The first preferred label, if any.
    #[must_use]
    pub fn pref_label(&self) -> Option<&str> {
        self.pref_labels.first().map(String::as_str)
    }
}

/// Subjects indexed in the order they were first seen.
///
/// Repeated statements are absorbed: a label already recorded for a subject
/// is not recorded again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConceptIndex {
    subjects: IndexMap<String, Concept>,
}

impl ConceptIndex {
    /// An empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one statement. Statements other than concept typing and
    /// preferred or alternate labels are ignored.
    pub fn add(&mut self, triple: &RdfTriple) {
        let predicate = triple.predicate.as_str();
        let is_type = predicate == RDF_TYPE;
        if is_type && triple.object != RdfNode::uri(SKOS_CONCEPT) {
            return;
        }
        let is_label = predicate == SKOS_PREF_LABEL || predicate == SKOS_ALT_LABEL;
        if !is_type && !(is_label && triple.object.is_literal()) {
            return;
        }

        let key = triple.subject.key();
        let concept = self
            .subjects
            .entry(key.clone())
            .or_insert_with(|| Concept {
                uri: key,
                ..Concept::default()
            });
        if is_type {
            concept.is_concept = true;
            return;
        }
        let Some(text) = triple.object.literal_value() else {
            return;
        };
        let labels = if predicate == SKOS_PREF_LABEL {
            &mut concept.pref_labels
        } else {
            &mut concept.alt_labels
        };
        if !labels.iter().any(|l| l == text) {
            labels.push(text.to_string());
        }
    }

    /// Subjects typed `skos:Concept`.
    pub fn concepts(&self) -> impl Iterator<Item = &Concept> {
        self.subjects.values().filter(|c| c.is_concept)
    }

    /// Number of subjects typed `skos:Concept`.
    #[must_use]
    pub fn concept_count(&self) -> usize {
        self.concepts().count()
    }

    /// Look up a subject by URI.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<&Concept> {
        self.subjects.get(uri)
    }

    /// Number of subjects with any recorded statement.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

/// The outcome of one extraction pass.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// Concepts and labels collected
    pub index: ConceptIndex,
    /// Statements parsed, before filtering
    pub statements: usize,
    /// Statements that passed the filter
    pub forwarded: usize,
    /// Malformed statements skipped
    pub skipped: usize,
    /// Set when extraction ended at the forwarding limit
    pub stopped: Option<StopReached>,
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Got {} terms", self.index.concept_count())
    }
}

/// Extract SKOS concepts and labels from an N-Triples stream.
///
/// With `stop_after` set, extraction ends once that many statements have
/// passed the filter. Reaching the limit is logged as a warning and the
/// partial index is returned.
///
/// # Errors
///
/// Returns [`MarcError::IoError`] if reading the stream fails.
pub fn extract_concepts<R: Read>(reader: R, stop_after: Option<usize>) -> Result<Extraction> {
    let mut index = ConceptIndex::new();
    let mut sink = FilterSink::new(TripleFilter::skos_labels(), stop_after, |t| index.add(&t));
    let summary = for_each_ntriple(reader, |t| sink.triple(t))?;
    let forwarded = sink.forwarded();

    if let Some(stop) = summary.stopped {
        warn!("{stop}");
    }
    debug!(
        statements = summary.statements,
        forwarded,
        skipped = summary.skipped,
        "vocabulary pass complete"
    );
    Ok(Extraction {
        index,
        statements: summary.statements,
        forwarded,
        skipped: summary.skipped,
        stopped: summary.stopped,
    })
}

/// Extract SKOS concepts from a file, gzip-decompressing `.gz` names.
///
/// # Errors
///
/// Returns [`MarcError::Source`] naming `path` if it cannot be read.
pub fn extract_concepts_from_file(path: &Path, stop_after: Option<usize>) -> Result<Extraction> {
    let stream = SourceStream::open(path)?;
    extract_concepts(stream, stop_after).map_err(|e: MarcError| e.in_source(path))
}
