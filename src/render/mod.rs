//! Rendering module: rebuilding paragraphs and documents with equations.

mod document;
mod paragraph;
mod preview;
mod result;

pub use document::fix_document;
pub use paragraph::{is_insertable, push_text_run, ParagraphRebuilder};
pub use preview::{preview, to_preview_text, PreviewItem};
pub use result::{FixReport, FixResult};
