//! Processing options and configuration.

use std::path::PathBuf;

use crate::convert::{
    Engine, FormulaConverter, NativeTransform, OmmlTransform, XsltTransform,
};

/// File name of the MathML to OMML style sheet.
pub const STYLESHEET_NAME: &str = "MML2OMML.XSL";

/// Options for fixing formulas in a document.
#[derive(Debug, Clone)]
pub struct FixOptions {
    /// Which MathML to OMML transform to use
    pub engine: Engine,

    /// Location of the MML2OMML style sheet
    pub stylesheet: PathBuf,

    /// XSLT processor used with the style sheet
    pub xslt_processor: String,

    /// Whether to rewrite primes and bare integrals before conversion
    pub normalize: bool,

    /// Whether rebuilt text runs reuse the first run's formatting
    pub keep_run_properties: bool,
}

impl FixOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the transform engine.
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    /// Use the built-in transform.
    pub fn native(mut self) -> Self {
        self.engine = Engine::Native;
        self
    }

    /// Set the style sheet location.
    pub fn with_stylesheet(mut self, path: impl Into<PathBuf>) -> Self {
        self.stylesheet = path.into();
        self
    }

    /// Set the XSLT processor program.
    pub fn with_xslt_processor(mut self, program: impl Into<String>) -> Self {
        self.xslt_processor = program.into();
        self
    }

    /// Enable or disable LaTeX normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable reuse of run formatting.
    pub fn with_run_properties(mut self, keep: bool) -> Self {
        self.keep_run_properties = keep;
        self
    }

    /// Build the configured transform.
    pub fn transform(&self) -> Box<dyn OmmlTransform> {
        match self.engine {
            Engine::Xslt => Box::new(
                XsltTransform::new(&self.stylesheet).with_processor(&self.xslt_processor),
            ),
            Engine::Native => Box::new(NativeTransform::new()),
        }
    }

    /// Build a converter for the configured transform.
    pub fn converter(&self) -> FormulaConverter {
        FormulaConverter::from_boxed(self.transform())
    }

    /// Check whether the configured transform has its resources.
    pub fn transform_available(&self) -> bool {
        self.transform().is_available()
    }
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            stylesheet: default_stylesheet_path(),
            xslt_processor: crate::convert::DEFAULT_PROCESSOR.to_string(),
            normalize: true,
            keep_run_properties: true,
        }
    }
}

/// Style sheet next to the running executable.
pub fn default_stylesheet_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(STYLESHEET_NAME)))
        .unwrap_or_else(|| PathBuf::from(STYLESHEET_NAME))
}
