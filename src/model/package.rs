//! OOXML package access.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect::is_zip_bytes;
use crate::error::{Error, Result};

/// Conventional location of the main document part.
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";

const PACKAGE_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// A Word package opened for rewriting.
///
/// Parts are read on demand. Writing copies every untouched entry as raw
/// compressed bytes, so only replaced parts differ from the input.
pub struct DocxPackage {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    main_part: String,
}

impl DocxPackage {
    /// Open a package from a file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Open a package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if !is_zip_bytes(&data) {
            return Err(Error::UnknownFormat);
        }
        let mut archive = ZipArchive::new(Cursor::new(data))?;
        let main_part = resolve_main_part(&mut archive)?;
        Ok(Self { archive, main_part })
    }

    /// Name of the main document part.
    pub fn main_part(&self) -> &str {
        &self.main_part
    }

    /// Number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.archive.len()
    }

    /// Read a part as UTF-8 text.
    pub fn read_part(&mut self, name: &str) -> Result<String> {
        read_part(&mut self.archive, name)
    }

    /// Read the main document part.
    pub fn main_document(&mut self) -> Result<String> {
        let name = self.main_part.clone();
        self.read_part(&name)
    }

    /// Serialize the package with some parts replaced.
    ///
    /// With no replacements the original bytes are returned unchanged.
    pub fn write(mut self, replacements: &HashMap<String, String>) -> Result<Vec<u8>> {
        if replacements.is_empty() {
            return Ok(self.into_bytes());
        }

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for index in 0..self.archive.len() {
            let name = self.archive.by_index_raw(index)?.name().to_string();
            match replacements.get(&name) {
                Some(content) => {
                    let options =
                        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                    writer.start_file(name, options)?;
                    writer.write_all(content.as_bytes())?;
                }
                None => {
                    let file = self.archive.by_index_raw(index)?;
                    writer.raw_copy_file(file)?;
                }
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }

    /// Return the original package bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.archive.into_inner().into_inner()
    }
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("main_part", &self.main_part)
            .field("parts", &self.archive.len())
            .finish()
    }
}

fn read_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> Result<String> {
    let mut file = archive.by_name(name)?;
    let mut bytes = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

/// Find the main part through the package relationships.
fn resolve_main_part(archive: &mut ZipArchive<Cursor<Vec<u8>>>) -> Result<String> {
    if has_part(archive, PACKAGE_RELS) {
        let rels = read_part(archive, PACKAGE_RELS)?;
        if let Some(target) = office_document_target(&rels)? {
            if has_part(archive, &target) {
                return Ok(target);
            }
            log::debug!("Relationship target {} not found in package", target);
        }
    }

    if has_part(archive, DEFAULT_MAIN_PART) {
        Ok(DEFAULT_MAIN_PART.to_string())
    } else {
        Err(Error::MissingPart(DEFAULT_MAIN_PART.to_string()))
    }
}

fn has_part(archive: &ZipArchive<Cursor<Vec<u8>>>, name: &str) -> bool {
    archive.file_names().any(|n| n == name)
}

/// Target of the `officeDocument` relationship, relative to the package root.
fn office_document_target(rels: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value()?.into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Type" => rel_type = Some(value),
                        b"Target" => target = Some(value),
                        _ => {}
                    }
                }
                if let (Some(rel_type), Some(target)) = (rel_type, target) {
                    if rel_type.ends_with(OFFICE_DOCUMENT_REL) {
                        return Ok(Some(target.trim_start_matches('/').to_string()));
                    }
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}
