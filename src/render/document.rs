//! Document pass: rebuild every candidate paragraph of a part.

use crate::convert::FormulaConverter;
use crate::model::Document;
use crate::parser::FixOptions;

use super::{FixReport, FixResult, ParagraphRebuilder};

/// Fix all formulas in a scanned document.
///
/// Paragraphs are processed in document order on the calling thread and
/// spliced into a copy of the part. Paragraphs that are not rebuilt keep
/// their original bytes; if none is rebuilt, [`FixResult::xml`] is `None`.
pub fn fix_document(
    document: &Document,
    converter: &FormulaConverter,
    options: &FixOptions,
) -> FixResult {
    let xml = document.xml.as_str();
    let rebuilder = ParagraphRebuilder::new(converter, options);

    let mut report = FixReport::new();
    report.paragraphs_scanned = document.paragraph_count();

    let mut output = String::with_capacity(xml.len() + xml.len() / 4);
    let mut cursor = 0usize;

    for paragraph in &document.paragraphs {
        if !paragraph.mentions_dollar() {
            continue;
        }
        if !paragraph.is_rebuildable() {
            report.skipped_protected += 1;
            log::debug!(
                "Skipping paragraph at byte {}: content would not survive a rebuild",
                paragraph.span.start
            );
            continue;
        }

        report.candidates += 1;
        let Some(rebuilt) = rebuilder.rebuild(xml, paragraph, &mut report) else {
            continue;
        };

        // Candidates never contain other paragraphs, so spans are disjoint.
        output.push_str(&xml[cursor..paragraph.span.start]);
        output.push_str(&rebuilt);
        cursor = paragraph.span.end;

        report.paragraphs_rewritten += 1;
        if paragraph.in_table {
            report.table_paragraphs_rewritten += 1;
        }
    }

    log::debug!(
        "{}: {} of {} formulas converted in {} paragraphs",
        document.part_name,
        report.converted,
        report.formulas_found,
        report.paragraphs_rewritten
    );

    if report.paragraphs_rewritten == 0 {
        return FixResult { xml: None, report };
    }

    output.push_str(&xml[cursor..]);
    FixResult {
        xml: Some(output),
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::scan_paragraphs;

    fn scanned(body: &str) -> Document {
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"urn:w\"><w:body>{}<w:sectPr/></w:body></w:document>",
            body
        );
        let paragraphs = scan_paragraphs(&xml).unwrap();
        Document::new("word/document.xml", xml, paragraphs)
    }

    fn fix(document: &Document) -> FixResult {
        let options = FixOptions::new().native();
        fix_document(document, &options.converter(), &options)
    }

    #[test]
    fn test_untouched_paragraphs_keep_bytes() {
        let first = "<w:p w14:paraId=\"1\"><w:r><w:t>intro</w:t></w:r></w:p>";
        let last = "<w:p><w:r><w:t>price: $5</w:t></w:r></w:p>";
        let document = scanned(&format!(
            "{}<w:p><w:r><w:t>$x+1$</w:t></w:r></w:p>{}",
            first, last
        ));

        let result = fix(&document);
        let xml = result.xml.unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains(first));
        assert!(xml.contains(last));
        assert!(xml.contains("<m:oMath"));
        assert!(xml.ends_with("<w:sectPr/></w:body></w:document>"));
        assert_eq!(result.report.paragraphs_rewritten, 1);
        assert_eq!(result.report.candidates, 2);
    }

    #[test]
    fn test_no_formulas_is_noop() {
        let document = scanned("<w:p><w:r><w:t>nothing to see</w:t></w:r></w:p>");
        let result = fix(&document);
        assert!(!result.is_modified());
        assert_eq!(result.report.paragraphs_scanned, 1);
        assert_eq!(result.report.candidates, 0);
    }

    #[test]
    fn test_table_and_protected_paragraphs() {
        let document = scanned(
            "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>$a^2$</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>$b$</w:t></w:r><w:r><w:fldChar w:fldCharType=\"begin\"/></w:r></w:p>",
        );
        let result = fix(&document);
        assert_eq!(result.report.table_paragraphs_rewritten, 1);
        assert_eq!(result.report.skipped_protected, 1);
        assert!(result.xml.unwrap().contains("<w:fldChar w:fldCharType=\"begin\"/>"));
    }
}
