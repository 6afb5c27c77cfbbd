//! Style-sheet transform through an external XSLT processor.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::{OmmlTransform, TransformError};

/// Default XSLT processor.
pub const DEFAULT_PROCESSOR: &str = "xsltproc";

/// Applies the MML2OMML style sheet to MathML.
///
/// The style sheet is looked up on every call, so placing it next to the
/// program while a batch runs takes effect immediately.
#[derive(Debug, Clone)]
pub struct XsltTransform {
    stylesheet: PathBuf,
    processor: String,
}

impl XsltTransform {
    /// Create a transform for the given style sheet using `xsltproc`.
    pub fn new(stylesheet: impl Into<PathBuf>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            processor: DEFAULT_PROCESSOR.to_string(),
        }
    }

    /// Use another processor accepting `<stylesheet> -` arguments.
    pub fn with_processor(mut self, processor: impl Into<String>) -> Self {
        self.processor = processor.into();
        self
    }

    /// Path of the style sheet.
    pub fn stylesheet(&self) -> &Path {
        &self.stylesheet
    }

    fn run(&self, mathml: &str) -> io::Result<std::process::Output> {
        let mut child = Command::new(&self.processor)
            .arg(&self.stylesheet)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(mathml.as_bytes())?;
        }
        child.wait_with_output()
    }
}

impl OmmlTransform for XsltTransform {
    fn name(&self) -> &str {
        "xslt"
    }

    fn is_available(&self) -> bool {
        self.stylesheet.is_file()
    }

    fn transform(&self, mathml: &str) -> Result<String, TransformError> {
        if !self.is_available() {
            return Err(TransformError::Unavailable(format!(
                "style sheet not found: {}",
                self.stylesheet.display()
            )));
        }

        let output = self.run(mathml).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                TransformError::Unavailable(format!("{} not found", self.processor))
            }
            _ => TransformError::Failed(e.to_string()),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TransformError::Failed(stderr.trim().to_string()));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| TransformError::Failed(e.to_string()))?;
        let omml = strip_declaration(&stdout).trim();
        if omml.is_empty() {
            return Err(TransformError::Failed("empty transform output".to_string()));
        }
        Ok(omml.to_string())
    }
}

/// Drop a leading `<?xml ...?>` declaration.
fn strip_declaration(xml: &str) -> &str {
    let trimmed = xml.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            return &trimmed[end + 2..];
        }
    }
    trimmed
}
