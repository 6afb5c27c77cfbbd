//! Integration tests for fixing whole documents.

use std::io::{Cursor, Read, Write};

use docxmath::{fix_bytes, fix_file, inspect_file, parse_bytes, DocxMath, Error, FixOptions};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Build a minimal Word package around the given body content.
fn docx(body: &str) -> Vec<u8> {
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}<w:sectPr/></w:body></w:document>",
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
    ] {
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn paragraph(text: &str) -> String {
    format!(
        "<w:p><w:r><w:rPr><w:rFonts w:eastAsia=\"SimSun\"/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        text
    )
}

fn main_part(data: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(data.to_vec())).unwrap();
    let mut file = archive.by_name("word/document.xml").unwrap();
    let mut xml = String::new();
    file.read_to_string(&mut xml).unwrap();
    xml
}

fn native() -> FixOptions {
    FixOptions::new().native()
}

#[test]
fn test_formula_between_literal_runs() {
    let data = docx(&paragraph("已知 $f(x)=x^2$，求导"));
    let fixed = fix_bytes(&data, &native()).unwrap();

    assert!(fixed.is_modified());
    assert_eq!(fixed.report.converted, 1);
    assert_eq!(fixed.report.paragraphs_rewritten, 1);

    let xml = main_part(&fixed.data);
    let before = xml.find("<w:t xml:space=\"preserve\">已知 </w:t>").unwrap();
    let equation = xml.find("<m:oMath").unwrap();
    let after = xml.find("<w:t xml:space=\"preserve\">，求导</w:t>").unwrap();
    assert!(before < equation && equation < after);
    assert!(!xml.contains("$f(x)"));
    assert_eq!(xml.matches("<w:rFonts w:eastAsia=\"SimSun\"/>").count(), 2);
}

#[test]
fn test_missing_stylesheet_leaves_document_identical() {
    let dir = tempfile::tempdir().unwrap();
    let options = FixOptions::new().with_stylesheet(dir.path().join("MML2OMML.XSL"));
    let data = docx(&paragraph("$E=mc^2$"));

    let fixed = fix_bytes(&data, &options).unwrap();
    assert_eq!(fixed.data, data);
    assert!(!fixed.is_modified());
    assert_eq!(fixed.report.unavailable, 1);
    assert_eq!(fixed.report.warnings.len(), 1);
}

#[test]
fn test_missing_stylesheet_warns_once_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let options = FixOptions::new().with_stylesheet(dir.path().join("MML2OMML.XSL"));
    let body = format!(
        "{}{}",
        paragraph("$a$ and $b$"),
        paragraph("$c$")
    );

    let fixed = fix_bytes(&docx(&body), &options).unwrap();
    assert_eq!(fixed.report.unavailable, 3);
    assert_eq!(fixed.report.warnings.len(), 1);
}

#[test]
fn test_document_without_formulas_is_unchanged() {
    let data = docx(&format!(
        "{}{}",
        paragraph("plain text"),
        paragraph("cost is $5 total")
    ));
    let fixed = fix_bytes(&data, &native()).unwrap();
    assert_eq!(fixed.data, data);
    assert_eq!(fixed.report.formulas_found, 0);
}

#[test]
fn test_empty_display_formula_stays_text() {
    let data = docx(&paragraph("$$"));
    let fixed = fix_bytes(&data, &native()).unwrap();
    assert_eq!(fixed.data, data);
    assert_eq!(fixed.report.formulas_found, 0);
}

#[test]
fn test_table_cells_are_fixed() {
    let body = format!(
        "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
        paragraph("$x^2$"),
        paragraph("no math")
    );
    let fixed = fix_bytes(&docx(&body), &native()).unwrap();

    assert_eq!(fixed.report.table_paragraphs_rewritten, 1);
    let xml = main_part(&fixed.data);
    assert!(xml.contains("<w:tc><w:p><w:r><w:rPr>"));
    assert!(xml.contains("<m:sSup>"));
    assert!(xml.contains("no math"));
}

#[test]
fn test_protected_paragraph_is_skipped() {
    let body = "<w:p><w:hyperlink><w:r><w:t>$x$</w:t></w:r></w:hyperlink></w:p>";
    let data = docx(body);
    let fixed = fix_bytes(&data, &native()).unwrap();
    assert_eq!(fixed.data, data);
    assert_eq!(fixed.report.skipped_protected, 1);
}

#[test]
fn test_other_parts_are_preserved() {
    let data = docx(&paragraph("$x$"));
    let fixed = fix_bytes(&data, &native()).unwrap();

    let mut archive = ZipArchive::new(Cursor::new(fixed.data)).unwrap();
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    assert_eq!(names, ["[Content_Types].xml", "_rels/.rels", "word/document.xml"]);

    let mut rels = String::new();
    archive
        .by_name("_rels/.rels")
        .unwrap()
        .read_to_string(&mut rels)
        .unwrap();
    assert_eq!(rels, PACKAGE_RELS);
}

#[test]
fn test_fix_is_stable_on_second_run() {
    let data = docx(&paragraph("given $a+b$"));
    let first = fix_bytes(&data, &native()).unwrap();
    let second = fix_bytes(&first.data, &native()).unwrap();
    assert!(!second.is_modified());
    assert_eq!(second.data, first.data);
}

#[test]
fn test_fix_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("homework.docx");
    let output = dir.path().join("homework_fixed.docx");
    std::fs::write(&input, docx(&paragraph("$\\frac{1}{2}$"))).unwrap();

    let report = fix_file(&input, &output, &native()).unwrap();
    assert_eq!(report.converted, 1);

    let written = std::fs::read(&output).unwrap();
    assert!(main_part(&written).contains("<m:f>"));

    let inspected = inspect_file(&input, &native()).unwrap();
    assert_eq!(inspected.formulas_found, 1);
}

#[test]
fn test_unreadable_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.docx");
    let output = dir.path().join("notes_fixed.docx");
    std::fs::write(&input, b"this is not a zip").unwrap();

    let result = fix_file(&input, &output, &native());
    assert!(matches!(result, Err(Error::UnknownFormat)));
    assert!(!output.exists());
}

#[test]
fn test_parse_bytes_scans_paragraphs() {
    let data = docx(&format!("{}{}", paragraph("a"), paragraph("$b$")));
    let document = parse_bytes(&data).unwrap();
    assert_eq!(document.part_name, "word/document.xml");
    assert_eq!(document.paragraph_count(), 2);
    assert_eq!(document.candidates().count(), 1);
}

#[test]
fn test_builder_fix_bytes() {
    let data = docx(&paragraph("$y'$"));
    let fixed = DocxMath::new().native().fix_bytes(&data).unwrap();
    assert_eq!(fixed.report.converted, 1);
}

#[test]
fn test_page_break_and_symbol_survive() {
    let body = "<w:p><w:r><w:t>see $x$</w:t><w:br w:type=\"page\"/>\
                <w:sym w:font=\"Symbol\" w:char=\"F061\"/><w:t>next</w:t></w:r></w:p>";
    let data = docx(body);
    let fixed = fix_bytes(&data, &native()).unwrap();
    assert_eq!(fixed.data, data);
    assert_eq!(fixed.report.skipped_protected, 1);
}

#[test]
fn test_malformed_formula_kept_beside_converted_one() {
    let data = docx(&paragraph("$a+b$ then $\\unknowncmd x$"));
    let fixed = fix_bytes(&data, &native()).unwrap();

    assert_eq!(fixed.report.converted, 1);
    assert_eq!(fixed.report.failed, 1);
    let xml = main_part(&fixed.data);
    assert_eq!(xml.matches("<m:oMath").count(), 1);
    assert!(xml.contains("<w:t xml:space=\"preserve\">$\\unknowncmd x$</w:t>"));
}

#[test]
fn test_fix_file_leaves_no_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lesson.docx");
    let output = dir.path().join("lesson_fixed.docx");
    std::fs::write(&input, docx(&paragraph("$x$"))).unwrap();
    std::fs::write(&output, b"stale").unwrap();

    fix_file(&input, &output, &native()).unwrap();

    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, ["lesson.docx", "lesson_fixed.docx"]);
    assert!(main_part(&std::fs::read(&output).unwrap()).contains("<m:oMath"));
}

#[test]
fn test_failed_write_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("lesson.docx");
    let output = dir.path().join("missing").join("lesson_fixed.docx");
    std::fs::write(&input, docx(&paragraph("$x$"))).unwrap();

    let result = fix_file(&input, &output, &native());
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(!output.exists());
    assert!(!dir.path().join("missing").exists());
}
