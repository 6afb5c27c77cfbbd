//! DOCX parsing module.

mod docx_parser;
mod options;

pub use docx_parser::{parse_document, scan_paragraphs};
pub use options::{default_stylesheet_path, FixOptions, STYLESHEET_NAME};
