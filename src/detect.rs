//! Word package detection and validation.

use crate::error::{Error, Result};
use crate::model::DocxPackage;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Word package information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxFormat {
    /// Name of the main document part (e.g., "word/document.xml")
    pub main_part: String,
    /// Number of parts in the package
    pub part_count: usize,
}

impl std::fmt::Display for DocxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DOCX ({}, {} parts)", self.main_part, self.part_count)
    }
}

/// ZIP local file header: PK\x03\x04
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// ZIP end of central directory, found first in empty archives
const ZIP_EMPTY_MAGIC: &[u8] = b"PK\x05\x06";

/// Detect a Word package from a file path.
///
/// # Arguments
/// * `path` - Path to the .docx file
///
/// # Returns
/// * `Ok(DocxFormat)` if the file is a Word package
/// * `Err(Error::UnknownFormat)` if the file is not a ZIP archive
/// * `Err(Error::MissingPart(_))` if the archive has no main document part
///
/// # Example
/// ```no_run
/// use docxmath::detect::detect_format_from_path;
///
/// let format = detect_format_from_path("homework.docx").unwrap();
/// println!("Main part: {}", format.main_part);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<DocxFormat> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; 4];
    if reader.read_exact(&mut header).is_err() || !is_zip_bytes(&header) {
        return Err(Error::UnknownFormat);
    }
    describe(&DocxPackage::open(path)?)
}

/// Detect a Word package from bytes.
///
/// Unlike [`is_zip_bytes`], this opens the archive and resolves the main
/// document part.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<DocxFormat> {
    if !is_zip_bytes(data) {
        return Err(Error::UnknownFormat);
    }
    describe(&DocxPackage::from_bytes(data.to_vec())?)
}

fn describe(package: &DocxPackage) -> Result<DocxFormat> {
    Ok(DocxFormat {
        main_part: package.main_part().to_string(),
        part_count: package.part_count(),
    })
}

/// Check if bytes start with a ZIP signature.
pub fn is_zip_bytes(data: &[u8]) -> bool {
    data.starts_with(ZIP_MAGIC) || data.starts_with(ZIP_EMPTY_MAGIC)
}

/// Check if a file is a Word package.
pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

/// Check if bytes represent a Word package.
pub fn is_docx_bytes(data: &[u8]) -> bool {
    detect_format_from_bytes(data).is_ok()
}
