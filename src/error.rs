//! Error types for docxmath library.

use std::io;
use thiserror::Error;

/// Result type alias for docxmath operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Document-level errors.
///
/// Per-formula problems never surface here: they are reported as
/// [`ConversionResult`](crate::convert::ConversionResult) values and fall
/// back to the original text.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a ZIP-based Word document.
    #[error("Unknown file format: not a valid DOCX package")]
    UnknownFormat,

    /// The package could not be read or written.
    #[error("Package error: {0}")]
    Zip(String),

    /// A part required to process the document is missing.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Malformed XML inside a package part.
    #[error("XML error: {0}")]
    Xml(String),

    /// A part is not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(e) => Error::Io(e),
            zip::result::ZipError::InvalidArchive(_) => Error::UnknownFormat,
            zip::result::ZipError::FileNotFound => Error::MissingPart(err.to_string()),
            _ => Error::Zip(err.to_string()),
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Error::Encoding(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownFormat;
        assert_eq!(
            err.to_string(),
            "Unknown file format: not a valid DOCX package"
        );

        let err = Error::MissingPart("word/document.xml".into());
        assert_eq!(err.to_string(), "Missing package part: word/document.xml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_zip_io_error_conversion() {
        let zip_err = zip::result::ZipError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        let err: Error = zip_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
