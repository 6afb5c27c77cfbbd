//! Fix report with per-run statistics.

use serde::Serialize;

use crate::convert::ConversionResult;

/// Statistics collected while fixing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FixReport {
    /// Paragraphs found in the main part
    pub paragraphs_scanned: usize,

    /// Paragraphs containing `$` that were eligible for a rebuild
    pub candidates: usize,

    /// Paragraphs containing `$` left alone because of protected content
    pub skipped_protected: usize,

    /// Paragraphs replaced in the output
    pub paragraphs_rewritten: usize,

    /// Replaced paragraphs that sit inside table cells
    pub table_paragraphs_rewritten: usize,

    /// Formula candidates seen in eligible paragraphs
    pub formulas_found: usize,

    /// Formulas turned into equations
    pub converted: usize,

    /// Formulas kept as text after a conversion failure
    pub failed: usize,

    /// Formulas kept as text because the transform was unavailable
    pub unavailable: usize,

    /// Warnings raised during the run
    pub warnings: Vec<String>,
}

impl FixReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one conversion outcome.
    pub fn record(&mut self, result: &ConversionResult) {
        match result {
            ConversionResult::Markup(_) => self.converted += 1,
            ConversionResult::Unavailable => self.unavailable += 1,
            ConversionResult::Failed(_) => self.failed += 1,
        }
    }

    /// Add a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Check if the document was changed.
    pub fn is_modified(&self) -> bool {
        self.paragraphs_rewritten > 0
    }

    /// Number of formulas kept as their original text.
    pub fn kept_as_text(&self) -> usize {
        self.failed + self.unavailable
    }
}

/// Outcome of a document pass.
#[derive(Debug, Clone)]
pub struct FixResult {
    /// The rewritten part, or `None` when nothing changed
    pub xml: Option<String>,

    /// Statistics for the pass
    pub report: FixReport,
}

impl FixResult {
    /// Check if the part was rewritten.
    pub fn is_modified(&self) -> bool {
        self.xml.is_some()
    }
}
