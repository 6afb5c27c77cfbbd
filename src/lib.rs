//! # docxmath
//!
//! Turn literal LaTeX formulas in Word documents into native equations.
//!
//! Text such as `$E=mc^2$` or `$$\int_0^1 x dx$$` pasted into a `.docx` file
//! is located, lightly normalized, converted LaTeX -> MathML -> OMML and
//! written back as a Word equation object. Anything that cannot be converted
//! stays exactly as it was.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxmath::{fix_file, FixOptions};
//!
//! fn main() -> docxmath::Result<()> {
//!     let options = FixOptions::new().with_stylesheet("MML2OMML.XSL");
//!     let report = fix_file("homework.docx", "homework_fixed.docx", &options)?;
//!     println!("{} formulas converted", report.converted);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Formula location**: `$...$` and `$$...$$` spans, one line at a time
//! - **Normalization**: primes and bare integral bodies rewritten for the converter
//! - **Two transforms**: the MML2OMML style sheet or a built-in mapping
//! - **Safe fallback**: unconverted formulas and untouched paragraphs keep their bytes
//! - **Tables**: paragraphs inside table cells are handled like body text

pub mod convert;
pub mod detect;
pub mod error;
pub mod formula;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    ConversionResult, Engine, FormulaConverter, NativeTransform, OmmlTransform, TransformError,
    XsltTransform,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, DocxFormat};
pub use error::{Error, Result};
pub use formula::{locate, normalize, Formula, Segment};
pub use model::{Document, DocxPackage, Paragraph};
pub use parser::{FixOptions, STYLESHEET_NAME};
pub use render::{FixReport, PreviewItem};

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to the input file stem for the default output name.
pub const OUTPUT_SUFFIX: &str = "_fixed";

/// Parse a Word document and return its main part with scanned paragraphs.
///
/// # Example
///
/// ```no_run
/// use docxmath::parse_file;
///
/// let doc = parse_file("homework.docx").unwrap();
/// println!("Paragraphs: {}", doc.paragraph_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let mut package = DocxPackage::open(path)?;
    parser::parse_document(&mut package)
}

/// Parse a Word document from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let mut package = DocxPackage::from_bytes(data.to_vec())?;
    parser::parse_document(&mut package)
}

/// Fix all formulas in a Word document held in memory.
///
/// The returned bytes equal the input when nothing was converted.
///
/// # Example
///
/// ```no_run
/// use docxmath::{fix_bytes, FixOptions};
///
/// let data = std::fs::read("homework.docx").unwrap();
/// let fixed = fix_bytes(&data, &FixOptions::new().native()).unwrap();
/// std::fs::write("homework_fixed.docx", fixed.data).unwrap();
/// ```
pub fn fix_bytes(data: &[u8], options: &FixOptions) -> Result<FixOutput> {
    let mut package = DocxPackage::from_bytes(data.to_vec())?;
    let document = parser::parse_document(&mut package)?;
    let converter = options.converter();
    let result = render::fix_document(&document, &converter, options);

    let mut replacements = HashMap::new();
    if let Some(xml) = result.xml {
        replacements.insert(document.part_name, xml);
    }

    let data = package.write(&replacements)?;
    Ok(FixOutput {
        data,
        report: result.report,
    })
}

/// Fix all formulas in a Word document and write the result to `output`.
///
/// Nothing is written if the input cannot be read or parsed, and a failed
/// write leaves no partial file behind.
///
/// # Example
///
/// ```no_run
/// use docxmath::{default_output_path, fix_file, FixOptions};
///
/// let output = default_output_path("homework.docx");
/// let report = fix_file("homework.docx", &output, &FixOptions::default()).unwrap();
/// for warning in &report.warnings {
///     eprintln!("{}", warning);
/// }
/// ```
pub fn fix_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &FixOptions,
) -> Result<FixReport> {
    let data = fs::read(input)?;
    let fixed = fix_bytes(&data, options)?;
    write_atomic(output.as_ref(), &fixed.data)?;
    Ok(fixed.report)
}

/// Write through a temporary file in the target directory, then rename.
fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

/// Run the fix pass over a document without writing anything.
pub fn inspect_file<P: AsRef<Path>>(path: P, options: &FixOptions) -> Result<FixReport> {
    let document = parse_file(path)?;
    let converter = options.converter();
    Ok(render::fix_document(&document, &converter, options).report)
}

/// Preview formula conversion for ad-hoc text.
///
/// # Example
///
/// ```no_run
/// use docxmath::{preview_text, FixOptions};
///
/// for item in preview_text("Given $f'(x)$", &FixOptions::new().native()) {
///     println!("{:?}", item);
/// }
/// ```
pub fn preview_text(text: &str, options: &FixOptions) -> Vec<PreviewItem> {
    render::preview(text, &options.converter(), options)
}

/// Default output path: `<stem>_fixed.docx` next to the input.
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{}{}.docx", stem, OUTPUT_SUFFIX))
}

/// Output of fixing a document.
#[derive(Debug, Clone)]
pub struct FixOutput {
    /// The package bytes
    pub data: Vec<u8>,
    /// Statistics for the run
    pub report: FixReport,
}

impl FixOutput {
    /// Check if the document was changed.
    pub fn is_modified(&self) -> bool {
        self.report.is_modified()
    }
}

/// Builder for fixing Word documents.
///
/// # Example
///
/// ```no_run
/// use docxmath::DocxMath;
///
/// let report = DocxMath::new()
///     .native()
///     .without_normalization()
///     .fix_file("homework.docx", "homework_fixed.docx")?;
/// println!("{} paragraphs rewritten", report.paragraphs_rewritten);
/// # Ok::<(), docxmath::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxMath {
    options: FixOptions,
}

impl DocxMath {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the built-in MathML to OMML transform.
    pub fn native(mut self) -> Self {
        self.options = self.options.native();
        self
    }

    /// Set the transform engine.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.options = self.options.with_engine(engine);
        self
    }

    /// Set the MML2OMML style sheet location.
    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_stylesheet(path);
        self
    }

    /// Set the XSLT processor program.
    pub fn with_xslt_processor(mut self, program: impl Into<String>) -> Self {
        self.options = self.options.with_xslt_processor(program);
        self
    }

    /// Skip LaTeX normalization.
    pub fn without_normalization(mut self) -> Self {
        self.options = self.options.with_normalize(false);
        self
    }

    /// Get the options in use.
    pub fn options(&self) -> &FixOptions {
        &self.options
    }

    /// Fix a file, writing the result to `output`.
    pub fn fix_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> Result<FixReport> {
        fix_file(input, output, &self.options)
    }

    /// Fix a document held in memory.
    pub fn fix_bytes(&self, data: &[u8]) -> Result<FixOutput> {
        fix_bytes(data, &self.options)
    }

    /// Preview formula conversion for ad-hoc text.
    pub fn preview(&self, text: &str) -> Vec<PreviewItem> {
        preview_text(text, &self.options)
    }
}
