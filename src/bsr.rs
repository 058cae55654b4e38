//! Tag mentions in BIBCO Standard Record (BSR) documentation.
//!
//! The BSR is published as a prose document; saved as plain text, its tables
//! mention tags like `245`, `6XX`, `100$e` or `008/15-17` amid commentary.
//! [`extract_bsr_tags`] pulls out every tag-like token line by line and
//! reports what it ignored, so the list can be checked by hand.
//!
//! Each line that contains something tag-shaped is normalized before being
//! split into tokens:
//!
//! 1. `, etc.` is dropped
//! 2. parenthesized asides are dropped
//! 3. fixed-field positions are cut back to the tag (`008/15-17` becomes `008`)
//! 4. `,`, `;` and `or` (with surrounding space) become token separators
//!
//! A token is accepted if it is exactly a tag pattern (digit followed by two
//! digits or `X`), optionally followed by a `$` subfield suffix.

use std::collections::BTreeSet;
use std::fmt;
use std::io::BufRead;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;

lazy_static! {
    static ref TAG_LIKE: Regex = Regex::new(r"\d[\dX][\dX]").expect("valid regex");
    static ref ETC: Regex = Regex::new(r",\s*etc\.").expect("valid regex");
    static ref PARENS: Regex = Regex::new(r"\s*\([^)]+\)").expect("valid regex");
    static ref FIXED_POSITIONS: Regex = Regex::new(r"\b(00\d)/[\d-]+").expect("valid regex");
    static ref SEPARATOR: Regex = Regex::new(r"\s*(,|;|or)\s*").expect("valid regex");
    static ref TAG_TOKEN: Regex =
        Regex::new(r"^\s*((\d[\dX][\dX])(\$\w+)?)\s*$").expect("valid regex");
}

/// One token found on a tag-bearing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BsrToken {
    /// A tag mention, possibly with subfield
    Tag {
        /// 1-based input line
        line: usize,
        /// Tag pattern, e.g. `6XX`
        tag: String,
        /// Full mention when a subfield was given, e.g. `100$e`
        subfield: Option<String>,
    },
    /// A token that is not a tag
    Ignored {
        /// 1-based input line
        line: usize,
        /// The token text
        text: String,
    },
}

/// Tags and subfields mentioned in a BSR document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BsrTags {
    /// Every token, in input order
    pub tokens: Vec<BsrToken>,
    /// Distinct tag patterns
    pub tags: BTreeSet<String>,
    /// Distinct tag and subfield mentions
    pub subfields: BTreeSet<String>,
}

impl fmt::Display for BsrTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                BsrToken::Tag {
                    line,
                    tag,
                    subfield,
                } => writeln!(f, "{line}# {}", subfield.as_deref().unwrap_or(tag))?,
                BsrToken::Ignored { text, .. } => writeln!(f, "ignored: {text}")?,
            }
        }
        writeln!(f, "#TAGS: {}", join(&self.tags))?;
        writeln!(f, "#SUBS: {}", join(&self.subfields))
    }
}

fn join(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Normalize one line into its separator-delimited tokens.
///
/// Returns `None` for lines with nothing tag-like in them.
fn split_line(line: &str) -> Option<Vec<String>> {
    if !TAG_LIKE.is_match(line) {
        return None;
    }
    let line = ETC.replace_all(line, "");
    let line = PARENS.replace_all(&line, "");
    let line = FIXED_POSITIONS.replace_all(&line, "$1");
    let line = SEPARATOR.replace_all(&line, ",");
    Some(line.split(',').map(str::to_string).collect())
}

/// Extract tag mentions from BSR text.
///
/// Input is read as bytes; anything that is not UTF-8 is replaced, since tag
/// mentions are plain ASCII.
///
/// # Errors
///
/// Returns [`MarcError::IoError`](crate::MarcError::IoError) if the source
/// cannot be read.
pub fn extract_bsr_tags<R: BufRead>(mut source: R) -> Result<BsrTags> {
    let mut found = BsrTags::default();
    let mut buf = Vec::new();
    let mut line_no = 0;
    loop {
        buf.clear();
        if source.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = String::from_utf8_lossy(&buf);
        let Some(tokens) = split_line(line.trim_end_matches(['\r', '\n'])) else {
            continue;
        };
        for token in tokens {
            let Some(caps) = TAG_TOKEN.captures(&token) else {
                found.tokens.push(BsrToken::Ignored {
                    line: line_no,
                    text: token.trim().to_string(),
                });
                continue;
            };
            let tag = caps[2].to_string();
            let subfield = caps.get(3).map(|_| caps[1].to_string());
            found.tags.insert(tag.clone());
            if let Some(sub) = &subfield {
                found.subfields.insert(sub.clone());
            }
            found.tokens.push(BsrToken::Tag {
                line: line_no,
                tag,
                subfield,
            });
        }
    }
    Ok(found)
}
