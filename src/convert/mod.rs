//! Formula conversion: LaTeX -> MathML -> OMML.
//!
//! The MathML to OMML step sits behind the [`OmmlTransform`] trait so the
//! style-sheet based transform and the built-in mapping are interchangeable.
//! [`FormulaConverter`] wraps the whole chain and never returns an error:
//! every failure becomes a [`ConversionResult`] the caller falls back on.
//!
//! # Example
//!
//! ```no_run
//! use docxmath::convert::{ConversionResult, FormulaConverter, NativeTransform};
//!
//! let converter = FormulaConverter::new(NativeTransform::new());
//! match converter.convert("E=mc^2") {
//!     ConversionResult::Markup(omml) => println!("{}", omml),
//!     other => println!("kept as text: {:?}", other),
//! }
//! ```

mod mathml;
mod native;
mod xslt;

pub use mathml::latex_to_mathml;
pub use native::NativeTransform;
pub use xslt::{XsltTransform, DEFAULT_PROCESSOR};

use serde::Serialize;
use std::fmt;

/// OMML namespace URI.
pub const OMML_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";

/// Outcome of converting one formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ConversionResult {
    /// Serialized `m:oMath` element ready for insertion
    Markup(String),

    /// The transform resource is missing; a configuration problem
    Unavailable,

    /// The formula could not be converted
    Failed(String),
}

impl ConversionResult {
    /// Check if the conversion produced markup.
    pub fn is_markup(&self) -> bool {
        matches!(self, ConversionResult::Markup(_))
    }
}

/// Error returned by an [`OmmlTransform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// A resource the transform depends on is missing.
    Unavailable(String),

    /// The transform ran and failed.
    Failed(String),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::Unavailable(msg) => write!(f, "transform unavailable: {}", msg),
            TransformError::Failed(msg) => write!(f, "transform failed: {}", msg),
        }
    }
}

impl std::error::Error for TransformError {}

/// MathML to OMML transform.
///
/// Implement this trait to plug in another conversion backend.
pub trait OmmlTransform: Send + Sync {
    /// Get the name of this transform.
    fn name(&self) -> &str;

    /// Check whether the transform's resources are present.
    fn is_available(&self) -> bool {
        true
    }

    /// Transform a MathML `<math>` document into a serialized `m:oMath`
    /// element.
    fn transform(&self, mathml: &str) -> Result<String, TransformError>;
}

/// Transform selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Apply the MML2OMML style sheet with an XSLT processor
    #[default]
    Xslt,

    /// Built-in MathML to OMML mapping
    Native,
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Xslt => write!(f, "xslt"),
            Engine::Native => write!(f, "native"),
        }
    }
}

/// Adapter running the full conversion chain for one formula.
pub struct FormulaConverter {
    transform: Box<dyn OmmlTransform>,
}

impl FormulaConverter {
    /// Create a converter using the given transform.
    pub fn new(transform: impl OmmlTransform + 'static) -> Self {
        Self {
            transform: Box::new(transform),
        }
    }

    /// Create a converter from a boxed transform.
    pub fn from_boxed(transform: Box<dyn OmmlTransform>) -> Self {
        Self { transform }
    }

    /// Get the transform in use.
    pub fn transform(&self) -> &dyn OmmlTransform {
        self.transform.as_ref()
    }

    /// Convert normalized LaTeX into OMML.
    ///
    /// Blank input fails without touching the conversion chain. The MathML
    /// step runs before the transform resource is checked.
    pub fn convert(&self, latex: &str) -> ConversionResult {
        if latex.trim().is_empty() {
            return ConversionResult::Failed("empty formula".to_string());
        }

        let mathml = match latex_to_mathml(latex) {
            Ok(mathml) => mathml,
            Err(reason) => return ConversionResult::Failed(reason),
        };

        match self.transform.transform(&mathml) {
            Ok(omml) => ConversionResult::Markup(omml),
            Err(TransformError::Unavailable(_)) => ConversionResult::Unavailable,
            Err(TransformError::Failed(reason)) => ConversionResult::Failed(reason),
        }
    }
}

impl fmt::Debug for FormulaConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaConverter")
            .field("transform", &self.transform.name())
            .finish()
    }
}
