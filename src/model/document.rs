//! Document-level types.

use super::Paragraph;
use serde::Serialize;

/// The main part of a Word document with its scanned paragraphs.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Package name of the part (e.g. `word/document.xml`)
    pub part_name: String,

    /// Raw XML of the part
    #[serde(skip)]
    pub xml: String,

    /// Paragraphs in document order, body and table cells alike
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    /// Create a document from a part and its paragraphs.
    pub fn new(part_name: impl Into<String>, xml: String, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            part_name: part_name.into(),
            xml,
            paragraphs,
        }
    }

    /// Get the number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    /// Get the number of paragraphs inside tables.
    pub fn table_paragraph_count(&self) -> usize {
        self.paragraphs.iter().filter(|p| p.in_table).count()
    }

    /// Paragraphs eligible for formula conversion.
    pub fn candidates(&self) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs.iter().filter(|p| p.is_candidate())
    }

    /// Paragraphs mentioning `$` that cannot be rebuilt safely.
    pub fn protected(&self) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs
            .iter()
            .filter(|p| p.mentions_dollar() && !p.is_rebuildable())
    }

    /// Get plain text content of the document, one line per paragraph.
    pub fn plain_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}
