//! Paragraph scanner for WordprocessingML parts.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::model::{Document, DocxPackage, Paragraph};

/// Elements a paragraph rebuild would destroy or corrupt.
const PROTECTED_ELEMENTS: &[&[u8]] = &[
    b"w:drawing",
    b"w:pict",
    b"w:object",
    b"w:fldChar",
    b"w:fldSimple",
    b"w:instrText",
    b"w:hyperlink",
    b"w:footnoteReference",
    b"w:endnoteReference",
    b"w:commentReference",
    b"w:sdt",
    b"w:ins",
    b"w:del",
    b"w:moveFrom",
    b"w:moveTo",
    b"w:ruby",
    b"w:sym",
    b"w:noBreakHyphen",
    b"w:softHyphen",
    b"w:ptab",
    b"w:smartTag",
    b"w:customXml",
    b"m:oMath",
    b"m:oMathPara",
];

/// Scan state for one open `<w:p>`.
struct Frame {
    paragraph: Paragraph,
    depth: usize,
    run_level: Option<usize>,
    first_run_seen: bool,
    capture_run_properties: bool,
    properties_start: Option<usize>,
    run_properties_start: Option<usize>,
    in_text: bool,
}

impl Frame {
    fn new(paragraph: Paragraph) -> Self {
        Self {
            paragraph,
            depth: 0,
            run_level: None,
            first_run_seen: false,
            capture_run_properties: false,
            properties_start: None,
            run_properties_start: None,
            in_text: false,
        }
    }

    fn open(&mut self, name: &[u8], before: usize, after: usize, empty: bool) {
        if PROTECTED_ELEMENTS.contains(&name) {
            self.paragraph.has_protected_content = true;
        }

        match name {
            b"w:pPr" if self.depth == 0 => {
                if empty {
                    self.paragraph.properties = Some(before..after);
                } else {
                    self.properties_start = Some(before);
                }
            }
            b"w:r" if !empty => {
                self.run_level = Some(self.depth + 1);
                self.capture_run_properties = !self.first_run_seen;
                self.first_run_seen = true;
            }
            b"w:rPr" if self.capture_run_properties && self.run_level == Some(self.depth) => {
                if empty {
                    self.paragraph.run_properties = Some(before..after);
                } else {
                    self.run_properties_start = Some(before);
                }
                self.capture_run_properties = false;
            }
            b"w:t" if !empty => self.in_text = true,
            b"w:tab" if self.run_level.is_some() => self.paragraph.text.push('\t'),
            b"w:br" | b"w:cr" if self.run_level.is_some() => self.paragraph.text.push('\n'),
            _ => {}
        }

        if !empty {
            self.depth += 1;
        }
    }

    fn close(&mut self, name: &[u8], after: usize) {
        self.depth = self.depth.saturating_sub(1);
        match name {
            b"w:pPr" if self.depth == 0 => {
                if let Some(start) = self.properties_start.take() {
                    self.paragraph.properties = Some(start..after);
                }
            }
            b"w:rPr" => {
                if let Some(start) = self.run_properties_start.take() {
                    self.paragraph.run_properties = Some(start..after);
                }
            }
            b"w:r" if self.run_level == Some(self.depth + 1) => {
                self.run_level = None;
                self.capture_run_properties = false;
            }
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }
}

/// Check if a `w:br` is a page or column break rather than a line break.
fn is_layout_break(e: &BytesStart<'_>) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.as_ref() == b"w:type" && attr.value.as_ref() != b"textWrapping"
    })
}

/// Locate every paragraph in a WordprocessingML part.
///
/// Body paragraphs and table-cell paragraphs are returned alike, in
/// document order. Paragraphs nested in text boxes are returned on their
/// own and mark their container with `has_nested`.
pub fn scan_paragraphs(xml: &str) -> Result<Vec<Paragraph>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut table_depth = 0usize;

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader.read_event()?;
        let after = reader.buffer_position() as usize;

        match event {
            Event::Start(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"w:p" => {
                        if let Some(parent) = stack.last_mut() {
                            parent.paragraph.has_nested = true;
                        }
                        let mut paragraph = Paragraph::new(before..after);
                        paragraph.in_table = table_depth > 0;
                        stack.push(Frame::new(paragraph));
                    }
                    b"w:tbl" => table_depth += 1,
                    other => {
                        if let Some(frame) = stack.last_mut() {
                            frame.open(other, before, after, false);
                            if other == b"w:br" && is_layout_break(&e) {
                                frame.paragraph.has_protected_content = true;
                            }
                        }
                    }
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"w:p" => {
                        if let Some(parent) = stack.last_mut() {
                            parent.paragraph.has_nested = true;
                        }
                        let mut paragraph = Paragraph::new(before..after);
                        paragraph.in_table = table_depth > 0;
                        paragraphs.push(paragraph);
                    }
                    other => {
                        if let Some(frame) = stack.last_mut() {
                            frame.open(other, before, after, true);
                            if other == b"w:br" && is_layout_break(&e) {
                                frame.paragraph.has_protected_content = true;
                            }
                        }
                    }
                }
            }
            Event::End(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"w:p" => {
                        let frame = stack
                            .pop()
                            .ok_or_else(|| Error::Xml("unbalanced </w:p>".to_string()))?;
                        let mut paragraph = frame.paragraph;
                        paragraph.span = paragraph.span.start..after;
                        paragraphs.push(paragraph);
                    }
                    b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                    other => {
                        if let Some(frame) = stack.last_mut() {
                            frame.close(other, after);
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let Some(frame) = stack.last_mut().filter(|f| f.in_text) {
                    frame.paragraph.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(frame) = stack.last_mut().filter(|f| f.in_text) {
                    frame
                        .paragraph
                        .text
                        .push_str(&String::from_utf8_lossy(c.as_ref()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::Xml("unclosed <w:p>".to_string()));
    }

    paragraphs.sort_by_key(|p| p.span.start);
    Ok(paragraphs)
}

/// Read and scan the main document part of a package.
pub fn parse_document(package: &mut DocxPackage) -> Result<Document> {
    let part_name = package.main_part().to_string();
    let xml = package.main_document()?;
    let paragraphs = scan_paragraphs(&xml)?;
    log::debug!(
        "Scanned {} paragraphs in {} ({} in tables)",
        paragraphs.len(),
        part_name,
        paragraphs.iter().filter(|p| p.in_table).count()
    );
    Ok(Document::new(part_name, xml, paragraphs))
}
