//! Document model types for Word packages.
//!
//! The model keeps byte ranges into the original XML instead of a full
//! object tree, so paragraphs that are not rewritten stay byte-identical.

mod document;
mod package;
mod paragraph;

pub use document::Document;
pub use package::{DocxPackage, DEFAULT_MAIN_PART};
pub use paragraph::Paragraph;
