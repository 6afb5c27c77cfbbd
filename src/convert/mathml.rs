//! LaTeX to MathML step.

use std::panic::{self, AssertUnwindSafe};

use latex2mathml::{latex_to_mathml as render_mathml, DisplayStyle};

/// Marker the parser leaves in its output for tokens it cannot handle.
const PARSE_ERROR_MARKER: &str = "[PARSE ERROR:";

/// Convert a LaTeX formula body into a MathML `<math>` document.
///
/// Inline and display formulas share one style. Parser errors, partial
/// output and parser panics all come back as `Err` with a reason.
pub fn latex_to_mathml(latex: &str) -> Result<String, String> {
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| {
        render_mathml(latex, DisplayStyle::Inline)
    }))
    .map_err(|_| "LaTeX parser panicked".to_string())?;

    let mathml = rendered.map_err(|e| e.to_string())?;
    if mathml.contains(PARSE_ERROR_MARKER) {
        return Err("unsupported LaTeX command or token".to_string());
    }
    Ok(mathml)
}
