//! Paragraph-level types.

use serde::Serialize;
use std::ops::Range;

/// A `<w:p>` element located inside a document part.
///
/// All ranges are byte offsets into the XML of the part the paragraph was
/// scanned from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// The whole element, start tag through end tag
    pub span: Range<usize>,

    /// The `<w:p ...>` start tag
    pub start_tag: Range<usize>,

    /// The `<w:pPr>` element, if any
    pub properties: Option<Range<usize>>,

    /// The `<w:rPr>` of the first run, if any
    pub run_properties: Option<Range<usize>>,

    /// Text of all runs; tabs and breaks become `\t` and `\n`
    pub text: String,

    /// Whether the paragraph sits inside a table cell
    pub in_table: bool,

    /// Whether other paragraphs are nested inside (text boxes)
    pub has_nested: bool,

    /// Whether the paragraph holds content a rebuild would destroy
    pub has_protected_content: bool,
}

impl Paragraph {
    /// Create a paragraph starting at the given start tag.
    pub fn new(start_tag: Range<usize>) -> Self {
        Self {
            span: start_tag.start..start_tag.end,
            start_tag,
            ..Self::default()
        }
    }

    /// Check if the text contains a `$` at all.
    pub fn mentions_dollar(&self) -> bool {
        self.text.contains('$')
    }

    /// Check if the paragraph can be rebuilt without losing content.
    pub fn is_rebuildable(&self) -> bool {
        !self.has_nested && !self.has_protected_content
    }

    /// Check if the paragraph is a candidate for formula conversion.
    pub fn is_candidate(&self) -> bool {
        self.mentions_dollar() && self.is_rebuildable()
    }

    /// Check if the paragraph is empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
