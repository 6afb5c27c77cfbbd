//! Live preview of formula conversion for ad-hoc text.

use serde::Serialize;

use crate::convert::{ConversionResult, FormulaConverter};
use crate::formula::{locate, normalize, Segment};
use crate::parser::FixOptions;

/// One located segment with its conversion outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewItem {
    /// Text left as is
    Literal { text: String },

    /// A formula candidate
    Formula {
        /// The span including delimiters
        source: String,
        /// LaTeX handed to the converter
        latex: String,
        /// Whether `$$` delimiters were used
        display: bool,
        /// Conversion outcome
        result: ConversionResult,
    },
}

impl PreviewItem {
    /// Check if this item is a formula that converted.
    pub fn is_converted(&self) -> bool {
        matches!(self, PreviewItem::Formula { result, .. } if result.is_markup())
    }
}

/// Run the formula pipeline over `text` without a document.
pub fn preview(text: &str, converter: &FormulaConverter, options: &FixOptions) -> Vec<PreviewItem> {
    locate(text)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(text) => PreviewItem::Literal {
                text: text.to_string(),
            },
            Segment::Formula(formula) => {
                let latex = if options.normalize {
                    normalize(formula.latex)
                } else {
                    formula.latex.to_string()
                };
                let result = converter.convert(&latex);
                PreviewItem::Formula {
                    source: formula.source.to_string(),
                    latex,
                    display: formula.display,
                    result,
                }
            }
        })
        .collect()
}

/// Render preview items as a plain-text listing.
pub fn to_preview_text(items: &[PreviewItem]) -> String {
    let mut out = String::new();

    for item in items {
        match item {
            PreviewItem::Literal { text } => {
                out.push_str(&format!("text     {:?}\n", text));
            }
            PreviewItem::Formula {
                source,
                latex,
                result,
                ..
            } => {
                out.push_str(&format!("formula  {}\n", source));
                out.push_str(&format!("  latex  {}\n", latex));
                let status = match result {
                    ConversionResult::Markup(omml) => format!("equation ({} bytes)", omml.len()),
                    ConversionResult::Unavailable => "kept as text (transform unavailable)".to_string(),
                    ConversionResult::Failed(reason) => format!("kept as text ({})", reason),
                };
                out.push_str(&format!("  result {}\n", status));
            }
        }
    }

    let formulas = items
        .iter()
        .filter(|item| matches!(item, PreviewItem::Formula { .. }))
        .count();
    let converted = items.iter().filter(|item| item.is_converted()).count();
    out.push_str(&format!("{} of {} formulas converted\n", converted, formulas));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::NativeTransform;

    #[test]
    fn test_preview_items() {
        let options = FixOptions::new().native();
        let converter = FormulaConverter::new(NativeTransform::new());
        let items = preview("已知 $f'(x)$，求导", &converter, &options);

        assert_eq!(items.len(), 3);
        assert_eq!(
            items[0],
            PreviewItem::Literal {
                text: "已知 ".to_string()
            }
        );
        match &items[1] {
            PreviewItem::Formula {
                source,
                latex,
                display,
                ..
            } => {
                assert_eq!(source, "$f'(x)$");
                assert_eq!(latex, "f^{′}(x)");
                assert!(!display);
            }
            other => panic!("unexpected item: {:?}", other),
        }
        assert!(items[1].is_converted());
    }

    #[test]
    fn test_preview_without_normalization() {
        let options = FixOptions::new().native().with_normalize(false);
        let converter = options.converter();
        let items = preview("$$f''$$", &converter, &options);
        match &items[0] {
            PreviewItem::Formula { latex, display, .. } => {
                assert_eq!(latex, "f''");
                assert!(display);
            }
            other => panic!("unexpected item: {:?}", other),
        }
    }

    #[test]
    fn test_preview_text() {
        let options = FixOptions::new().native();
        let converter = options.converter();
        let text = to_preview_text(&preview("area of $x$", &converter, &options));
        assert!(text.contains("formula  $x$"));
        assert!(text.ends_with("1 of 1 formulas converted\n"));
    }
}
