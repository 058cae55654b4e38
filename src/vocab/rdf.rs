//! RDF triple model and streaming N-Triples input.
//!
//! Statements are parsed with oxrdfio and converted into the owned
//! [`RdfTriple`] model one at a time, so arbitrarily large dumps can be read
//! without building a graph.

use std::fmt;
use std::io::Read;
use std::ops::ControlFlow;

use oxrdf::vocab::xsd;
use oxrdf::{NamedOrBlankNode, Quad, Term};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser};
use serde::Serialize;
use tracing::debug;

use crate::error::{MarcError, Result};

/// A single RDF triple (subject, predicate, object).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RdfTriple {
    /// The subject of the triple.
    pub subject: RdfNode,
    /// The predicate (property) URI of the triple.
    pub predicate: String,
    /// The object of the triple.
    pub object: RdfNode,
}

impl RdfTriple {
    /// Creates a new RDF triple.
    #[must_use]
    pub fn new(subject: RdfNode, predicate: impl Into<String>, object: RdfNode) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for RdfTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {} .", self.subject, self.predicate, self.object)
    }
}

/// An RDF node (subject or object in a triple).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum RdfNode {
    /// A named node (IRI/URI).
    Uri(String),
    /// A blank node with a local identifier.
    BlankNode(String),
    /// A literal value with optional language tag or datatype.
    Literal {
        /// The literal value.
        value: String,
        /// Optional language tag (e.g., "en", "fr").
        language: Option<String>,
        /// Datatype URI, unset for plain strings.
        datatype: Option<String>,
    },
}

impl RdfNode {
    /// Creates a new URI node.
    #[must_use]
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    /// Creates a new blank node.
    #[must_use]
    pub fn blank(id: impl Into<String>) -> Self {
        Self::BlankNode(id.into())
    }

    /// Creates a new plain literal.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: None,
            datatype: None,
        }
    }

    /// Creates a new literal with a language tag.
    #[must_use]
    pub fn literal_with_lang(value: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            language: Some(lang.into()),
            datatype: None,
        }
    }

    /// Returns true if this is a URI node.
    #[must_use]
    pub const fn is_uri(&self) -> bool {
        matches!(self, Self::Uri(_))
    }

    /// Returns true if this is a literal.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// The lexical value of a literal.
    #[must_use]
    pub fn literal_value(&self) -> Option<&str> {
        match self {
            Self::Literal { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Key identifying a subject: the URI, or `_:id` for a blank node.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Uri(uri) => uri.clone(),
            Self::BlankNode(id) => format!("_:{id}"),
            Self::Literal { value, .. } => value.clone(),
        }
    }
}

impl fmt::Display for RdfNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => write!(f, "<{uri}>"),
            Self::BlankNode(id) => write!(f, "_:{id}"),
            Self::Literal {
                value,
                language,
                datatype,
            } => {
                write!(f, "\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            },
        }
    }
}

/// Counts from one pass over an N-Triples stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseSummary<B> {
    /// Statements parsed and handed to the callback.
    pub statements: usize,
    /// Statements skipped for syntax errors.
    pub skipped: usize,
    /// Set when the callback asked to stop early.
    pub stopped: Option<B>,
}

/// Parse N-Triples from `reader`, handing each statement to `on_triple`.
///
/// Malformed statements are logged and skipped. Parsing ends at the end of
/// input or as soon as `on_triple` returns [`ControlFlow::Break`].
///
/// # Errors
///
/// Returns [`MarcError::IoError`] if reading the stream fails.
pub fn for_each_ntriple<R, B, F>(reader: R, mut on_triple: F) -> Result<ParseSummary<B>>
where
    R: Read,
    F: FnMut(RdfTriple) -> ControlFlow<B>,
{
    let mut summary = ParseSummary {
        statements: 0,
        skipped: 0,
        stopped: None,
    };
    for result in RdfParser::from_format(RdfFormat::NTriples).for_reader(reader) {
        let quad = match result {
            Ok(quad) => quad,
            Err(RdfParseError::Syntax(e)) => {
                debug!(error = %e, "skipping malformed statement");
                summary.skipped += 1;
                continue;
            },
            Err(RdfParseError::Io(e)) => return Err(MarcError::IoError(e)),
            #[allow(unreachable_patterns)]
            Err(e) => return Err(MarcError::ParseError(e.to_string())),
        };
        let triple = match from_oxrdf_quad(&quad) {
            Ok(triple) => triple,
            Err(e) => {
                debug!(error = %e, "skipping unsupported statement");
                summary.skipped += 1;
                continue;
            },
        };
        summary.statements += 1;
        if let ControlFlow::Break(reason) = on_triple(triple) {
            summary.stopped = Some(reason);
            break;
        }
    }
    Ok(summary)
}

/// Converts an oxrdf Quad into an [`RdfTriple`], dropping the graph name.
fn from_oxrdf_quad(quad: &Quad) -> Result<RdfTriple> {
    let subject = match &quad.subject {
        NamedOrBlankNode::NamedNode(n) => RdfNode::Uri(n.as_str().to_string()),
        NamedOrBlankNode::BlankNode(b) => RdfNode::BlankNode(b.as_str().to_string()),
        #[allow(unreachable_patterns)]
        _ => {
            return Err(MarcError::ParseError("Unsupported subject type".into()));
        },
    };

    let object = match &quad.object {
        Term::NamedNode(n) => RdfNode::Uri(n.as_str().to_string()),
        Term::BlankNode(b) => RdfNode::BlankNode(b.as_str().to_string()),
        Term::Literal(lit) => {
            let language = lit.language().map(String::from);
            let datatype = if language.is_none() && lit.datatype() != xsd::STRING {
                Some(lit.datatype().as_str().to_string())
            } else {
                None
            };
            RdfNode::Literal {
                value: lit.value().to_string(),
                language,
                datatype,
            }
        },
        #[allow(unreachable_patterns)]
        _ => {
            return Err(MarcError::ParseError("Unsupported object type".into()));
        },
    };

    Ok(RdfTriple::new(subject, quad.predicate.as_str(), object))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<http://example.org/a> <http://www.w3.org/2004/02/skos/core#prefLabel> "Cats"@en .
_:b1 <http://example.org/p> <http://example.org/c> .
<http://example.org/a> <http://example.org/n> "3"^^<http://www.w3.org/2001/XMLSchema#integer> .
"#;

    fn parse_all(text: &str) -> (Vec<RdfTriple>, ParseSummary<()>) {
        let mut triples = Vec::new();
        let summary = for_each_ntriple(text.as_bytes(), |t| {
            triples.push(t);
            ControlFlow::Continue(())
        })
        .unwrap();
        (triples, summary)
    }

    #[test]
    fn test_parse_nodes() {
        let (triples, summary) = parse_all(DOC);
        assert_eq!(summary.statements, 3);
        assert_eq!(triples[0].subject, RdfNode::uri("http://example.org/a"));
        assert_eq!(triples[0].object, RdfNode::literal_with_lang("Cats", "en"));
        assert_eq!(triples[1].subject, RdfNode::blank("b1"));
        assert!(triples[1].object.is_uri());
        assert!(!triples[1].object.is_literal());
        assert_eq!(
            triples[2].object,
            RdfNode::Literal {
                value: "3".into(),
                language: None,
                datatype: Some("http://www.w3.org/2001/XMLSchema#integer".into()),
            }
        );
    }

    #[test]
    fn test_plain_string_has_no_datatype() {
        let (triples, _) = parse_all("<http://e.org/s> <http://e.org/p> \"x\" .\n");
        assert_eq!(triples[0].object, RdfNode::literal("x"));
    }

    #[test]
    fn test_malformed_statement_is_skipped() {
        let text = "<http://e.org/s> <http://e.org/p> \"ok\" .\nthis is not rdf .\n<http://e.org/s> <http://e.org/p> \"also ok\" .\n";
        let (triples, summary) = parse_all(text);
        assert_eq!(triples[0].object, RdfNode::literal("ok"));
        assert!(summary.skipped >= 1);
    }

    #[test]
    fn test_break_stops_parsing() {
        let mut seen = 0;
        let summary = for_each_ntriple(DOC.as_bytes(), |_| {
            seen += 1;
            if seen == 2 {
                ControlFlow::Break("enough")
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();
        assert_eq!(seen, 2);
        assert_eq!(summary.stopped, Some("enough"));
    }

    #[test]
    fn test_display_as_ntriples() {
        let triple = RdfTriple::new(
            RdfNode::blank("x"),
            "http://e.org/p",
            RdfNode::literal_with_lang("say \"hi\"", "en"),
        );
        assert_eq!(triple.to_string(), r#"_:x <http://e.org/p> "say \"hi\""@en ."#);
        assert_eq!(RdfNode::blank("x").key(), "_:x");
    }
}
