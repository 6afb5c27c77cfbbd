//! Formula location and normalization.
//!
//! Paragraph text is split into [`Segment`]s by [`locate`]; every formula
//! segment is then cleaned up by [`normalize`] before it reaches the
//! conversion chain.

mod locate;
mod normalize;

pub use locate::{has_formula, locate};
pub use normalize::{normalize, rewrite_integral, rewrite_primes};

use serde::Serialize;

/// A piece of paragraph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment<'a> {
    /// Plain text, re-emitted verbatim.
    Literal(&'a str),

    /// A `$...$` or `$$...$$` span suspected to contain LaTeX.
    Formula(Formula<'a>),
}

impl<'a> Segment<'a> {
    /// The exact substring of the paragraph this segment covers.
    pub fn source(&self) -> &'a str {
        match self {
            Segment::Literal(text) => text,
            Segment::Formula(formula) => formula.source,
        }
    }

    /// Check if this is a formula candidate.
    pub fn is_formula(&self) -> bool {
        matches!(self, Segment::Formula(_))
    }
}

/// A formula candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Formula<'a> {
    /// The span including its delimiters, used as fallback text
    pub source: &'a str,

    /// The LaTeX body with delimiters and surrounding whitespace removed
    pub latex: &'a str,

    /// Whether the span used `$$` delimiters
    pub display: bool,
}

impl<'a> Formula<'a> {
    /// Build a formula from a delimited span.
    ///
    /// Returns `None` when the body is empty after stripping every leading
    /// and trailing `$` and surrounding whitespace.
    pub fn from_span(source: &'a str) -> Option<Self> {
        let latex = source.trim_matches('$').trim();
        if latex.is_empty() {
            return None;
        }
        Some(Self {
            source,
            latex,
            display: source.starts_with("$$") && source.len() >= 4,
        })
    }
}

/// Concatenate the original text of all segments.
pub fn reconstruct(segments: &[Segment<'_>]) -> String {
    segments.iter().map(Segment::source).collect()
}
