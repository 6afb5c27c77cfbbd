//! Paragraph rebuilding.
//!
//! A candidate paragraph keeps its start tag and `w:pPr`; everything else is
//! regenerated from the located segments. When no formula converts, the
//! rebuild is abandoned and the original bytes stay in place.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::convert::{ConversionResult, Engine, FormulaConverter};
use crate::formula::{locate, normalize, Formula, Segment};
use crate::model::Paragraph;
use crate::parser::FixOptions;

use super::FixReport;

/// Rebuilds candidate paragraphs with native equations.
#[derive(Debug)]
pub struct ParagraphRebuilder<'a> {
    converter: &'a FormulaConverter,
    options: &'a FixOptions,
}

impl<'a> ParagraphRebuilder<'a> {
    /// Create a rebuilder.
    pub fn new(converter: &'a FormulaConverter, options: &'a FixOptions) -> Self {
        Self { converter, options }
    }

    /// Rebuild one paragraph of `xml`.
    ///
    /// Returns the replacement markup for `paragraph.span`, or `None` if the
    /// paragraph must stay as it is. Every formula outcome is counted in
    /// `report`.
    pub fn rebuild(
        &self,
        xml: &str,
        paragraph: &Paragraph,
        report: &mut FixReport,
    ) -> Option<String> {
        let segments = locate(&paragraph.text);
        if !segments.iter().any(Segment::is_formula) {
            return None;
        }

        let run_properties = match &paragraph.run_properties {
            Some(range) if self.options.keep_run_properties => &xml[range.clone()],
            _ => "",
        };

        let mut content = String::with_capacity(paragraph.span.len() * 2);
        let mut converted = 0usize;

        for segment in &segments {
            match segment {
                Segment::Literal(text) => push_text_run(&mut content, text, run_properties),
                Segment::Formula(formula) => {
                    report.formulas_found += 1;
                    match self.convert(formula, report) {
                        Some(omml) => {
                            content.push_str(&omml);
                            converted += 1;
                        }
                        None => push_text_run(&mut content, formula.source, run_properties),
                    }
                }
            }
        }

        if converted == 0 {
            return None;
        }

        let mut out = String::with_capacity(content.len() + 64);
        out.push_str(&xml[paragraph.start_tag.clone()]);
        if let Some(range) = &paragraph.properties {
            out.push_str(&xml[range.clone()]);
        }
        out.push_str(&content);
        out.push_str("</w:p>");
        Some(out)
    }

    /// Convert one formula, returning markup ready for insertion.
    fn convert(&self, formula: &Formula<'_>, report: &mut FixReport) -> Option<String> {
        let latex = if self.options.normalize {
            normalize(formula.latex)
        } else {
            formula.latex.to_string()
        };

        let result = self.converter.convert(&latex);
        match &result {
            ConversionResult::Markup(omml) if !is_insertable(omml) => {
                log::debug!("Rejected malformed equation for {}", formula.source);
                report.record(&ConversionResult::Failed("malformed equation".to_string()));
                return None;
            }
            ConversionResult::Markup(_) => {}
            ConversionResult::Unavailable => {
                if report.unavailable == 0 {
                    let message = self.unavailable_message();
                    log::warn!("{}", message);
                    report.warn(message);
                }
            }
            ConversionResult::Failed(reason) => {
                log::debug!("Keeping {} as text: {}", formula.source, reason);
            }
        }

        report.record(&result);
        match result {
            ConversionResult::Markup(omml) => Some(omml),
            _ => None,
        }
    }

    fn unavailable_message(&self) -> String {
        match self.options.engine {
            Engine::Xslt => format!(
                "MML2OMML style sheet not available at {} (processor: {}); formulas kept as text",
                self.options.stylesheet.display(),
                self.options.xslt_processor
            ),
            Engine::Native => format!(
                "{} transform unavailable; formulas kept as text",
                self.converter.transform().name()
            ),
        }
    }
}

/// Append a plain run holding `text`.
///
/// Tabs and line breaks become `w:tab` and `w:br` so the run reads back as
/// the same text.
pub fn push_text_run(out: &mut String, text: &str, run_properties: &str) {
    if text.is_empty() {
        return;
    }

    out.push_str("<w:r>");
    out.push_str(run_properties);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push_str("<w:br/>");
        }
        for (j, piece) in line.split('\t').enumerate() {
            if j > 0 {
                out.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                out.push_str("<w:t xml:space=\"preserve\">");
                out.push_str(&escape(piece));
                out.push_str("</w:t>");
            }
        }
    }
    out.push_str("</w:r>");
}

/// Check that a fragment is a single well-formed equation element.
pub fn is_insertable(fragment: &str) -> bool {
    let mut reader = Reader::from_str(fragment);
    let mut depth = 0usize;
    let mut roots = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    roots += 1;
                    if !is_equation_root(e.local_name().as_ref()) {
                        return false;
                    }
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    roots += 1;
                    if !is_equation_root(e.local_name().as_ref()) {
                        return false;
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Ok(Event::Text(t)) if depth == 0 => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return false;
                }
            }
            Ok(Event::Eof) => return depth == 0 && roots == 1,
            Ok(_) => {}
            Err(_) => return false,
        }
    }
}

fn is_equation_root(name: &[u8]) -> bool {
    matches!(name, b"oMath" | b"oMathPara")
}
