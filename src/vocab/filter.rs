//! Pattern filtering of triple streams.
//!
//! A [`TriplePattern`] matches statements position by position, with `None`
//! as a wildcard. A [`FilterSink`] forwards statements matching any of its
//! patterns to a downstream callback and can stop the stream after a fixed
//! number of forwarded statements.

use std::fmt;
use std::ops::ControlFlow;

use serde::Serialize;

use super::namespaces::{RDF_TYPE, SKOS_ALT_LABEL, SKOS_CONCEPT, SKOS_PREF_LABEL};
use super::rdf::{RdfNode, RdfTriple};

/// A triple pattern; unset positions match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriplePattern {
    /// Required subject
    pub subject: Option<RdfNode>,
    /// Required predicate URI
    pub predicate: Option<String>,
    /// Required object
    pub object: Option<RdfNode>,
}

impl TriplePattern {
    /// Build a pattern from its three positions.
    #[must_use]
    pub fn new(subject: Option<RdfNode>, predicate: Option<&str>, object: Option<RdfNode>) -> Self {
        TriplePattern {
            subject,
            predicate: predicate.map(str::to_string),
            object,
        }
    }

    /// The pattern matching every statement.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Returns true if every set position equals the statement's.
    #[must_use]
    pub fn matches(&self, triple: &RdfTriple) -> bool {
        self.subject.as_ref().map_or(true, |s| *s == triple.subject)
            && self.predicate.as_ref().map_or(true, |p| *p == triple.predicate)
            && self.object.as_ref().map_or(true, |o| *o == triple.object)
    }
}

/// A disjunction of triple patterns.
///
/// An empty filter matches nothing; use [`TripleFilter::accept_all`] to pass
/// every statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleFilter {
    patterns: Vec<TriplePattern>,
}

impl TripleFilter {
    /// Filter accepting statements that match any of `patterns`.
    #[must_use]
    pub fn new(patterns: Vec<TriplePattern>) -> Self {
        TripleFilter { patterns }
    }

    /// Filter accepting every statement.
    #[must_use]
    pub fn accept_all() -> Self {
        Self::new(vec![TriplePattern::any()])
    }

    /// Concept typing plus preferred and alternate labels.
    #[must_use]
    pub fn skos_labels() -> Self {
        Self::new(vec![
            TriplePattern::new(None, Some(RDF_TYPE), Some(RdfNode::uri(SKOS_CONCEPT))),
            TriplePattern::new(None, Some(SKOS_PREF_LABEL), None),
            TriplePattern::new(None, Some(SKOS_ALT_LABEL), None),
        ])
    }

    /// Returns true if some pattern matches.
    #[must_use]
    pub fn matches(&self, triple: &RdfTriple) -> bool {
        self.patterns.iter().any(|p| p.matches(triple))
    }
}

/// Raised by a [`FilterSink`] once its forwarding limit is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopReached {
    /// The configured limit
    pub limit: usize,
}

impl fmt::Display for StopReached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reached limit of {} triples extracted", self.limit)
    }
}

/// Forwards matching statements to a downstream callback.
///
/// With a limit of `n`, exactly `n` statements are forwarded (or fewer if the
/// input runs out) and the sink then answers [`ControlFlow::Break`].
///
/// ```
/// use std::ops::ControlFlow;
/// use marc_stats::vocab::{FilterSink, RdfNode, RdfTriple, TripleFilter};
///
/// let mut kept = Vec::new();
/// let mut sink = FilterSink::new(TripleFilter::accept_all(), Some(1), |t| kept.push(t));
/// let t = RdfTriple::new(RdfNode::uri("http://e.org/s"), "http://e.org/p", RdfNode::literal("x"));
/// assert!(matches!(sink.triple(t), ControlFlow::Break(_)));
/// drop(sink);
/// assert_eq!(kept.len(), 1);
/// ```
pub struct FilterSink<F> {
    filter: TripleFilter,
    stop_after: Option<usize>,
    forwarded: usize,
    downstream: F,
}

impl<F> fmt::Debug for FilterSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSink")
            .field("filter", &self.filter)
            .field("stop_after", &self.stop_after)
            .field("forwarded", &self.forwarded)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut(RdfTriple)> FilterSink<F> {
    /// Create a sink forwarding to `downstream`.
    pub fn new(filter: TripleFilter, stop_after: Option<usize>, downstream: F) -> Self {
        FilterSink {
            filter,
            stop_after,
            forwarded: 0,
            downstream,
        }
    }

    /// Offer one statement to the sink.
    pub fn triple(&mut self, triple: RdfTriple) -> ControlFlow<StopReached> {
        if let Some(limit) = self.stop_after {
            if self.forwarded >= limit {
                return ControlFlow::Break(StopReached { limit });
            }
        }
        if !self.filter.matches(&triple) {
            return ControlFlow::Continue(());
        }
        (self.downstream)(triple);
        self.forwarded += 1;
        match self.stop_after {
            Some(limit) if self.forwarded >= limit => ControlFlow::Break(StopReached { limit }),
            _ => ControlFlow::Continue(()),
        }
    }

    /// Statements forwarded so far.
    #[must_use]
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }
}
