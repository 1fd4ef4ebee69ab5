//! ZIP container access for XLSX workbooks.

use crate::error::{Error, Result};
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use log::debug;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

/// Canonical location of the shared-string part.
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Rewrite a UTF-16 encoding declaration to UTF-8.
///
/// Once UTF-16 XML has been decoded into a Rust `String`, the declaration
/// still claims UTF-16 and quick-xml would try to decode it a second time.
fn fix_xml_encoding_declaration(content: &str) -> String {
    let Some(rest) = content.strip_prefix("<?xml") else {
        return content.to_string();
    };
    let Some(end_decl) = rest.find("?>") else {
        return content.to_string();
    };
    let (decl, body) = rest.split_at(end_decl);
    let fixed = ["\"UTF-16\"", "'UTF-16'", "\"utf-16\"", "'utf-16'"]
        .iter()
        .fold(decl.to_string(), |acc, label| {
            acc.replace(&format!("encoding={label}"), "encoding=\"UTF-8\"")
        });
    format!("<?xml{fixed}{body}")
}

/// Decode XML bytes handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let body = &bytes[bom_len..];
        if encoding == UTF_8 {
            return String::from_utf8(body.to_vec())
                .map_err(|e| Error::Encoding(e.to_string()));
        }
        return decode_utf16(encoding, body);
    }

    // UTF-16 without a BOM: ASCII markup leaves NUL in every other byte
    if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 {
        return decode_utf16(UTF_16LE, bytes);
    }
    if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 {
        return decode_utf16(UTF_16BE, bytes);
    }

    match String::from_utf8(bytes.to_vec()) {
        Ok(s) => Ok(s),
        Err(e) => Ok(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

fn decode_utf16(encoding: &'static Encoding, bytes: &[u8]) -> Result<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(Error::Encoding(format!(
            "invalid {} sequence in XML part",
            encoding.name()
        )));
    }
    Ok(fix_xml_encoding_declaration(&text))
}

/// Sheet identifier encoded in a `.../worksheets/sheetN.xml` entry name.
fn worksheet_id(entry: &str) -> Option<u32> {
    let (dir, file) = entry.rsplit_once('/')?;
    if !(dir == "worksheets" || dir.ends_with("/worksheets")) {
        return None;
    }
    let digits = file.strip_prefix("sheet")?.strip_suffix(".xml")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// An XLSX workbook opened as a ZIP archive.
///
/// The archive is held in memory and released when the value is dropped.
pub struct WorkbookArchive {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl WorkbookArchive {
    /// Open a workbook from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xlsparse::container::WorkbookArchive;
    ///
    /// let archive = WorkbookArchive::open("report.xlsx")?;
    /// println!("{:?}", archive.list_sheet_ids());
    /// # Ok::<(), xlsparse::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("opening workbook archive {}", path.display());
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a workbook archive from a byte vector.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))?;
        debug!("archive holds {} entries", archive.len());
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Create a workbook archive from a reader.
    pub fn from_reader<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Sorted, distinct identifiers of every `worksheets/sheetN.xml` part.
    pub fn list_sheet_ids(&self) -> BTreeSet<u32> {
        let archive = self.archive.borrow();
        let ids = archive.file_names().filter_map(worksheet_id).collect();
        ids
    }

    /// Name of the worksheet part for `sheet_id`.
    ///
    /// Prefers the canonical `xl/worksheets/sheetN.xml`, falling back to any
    /// entry under a `worksheets/` directory with the same number.
    pub fn worksheet_part_name(&self, sheet_id: u32) -> Result<String> {
        let canonical = format!("xl/worksheets/sheet{sheet_id}.xml");
        if self.exists(&canonical) {
            return Ok(canonical);
        }
        let archive = self.archive.borrow();
        let found = archive
            .file_names()
            .find(|name| worksheet_id(name) == Some(sheet_id))
            .map(String::from);
        found.ok_or(Error::SheetNotFound(sheet_id))
    }

    /// Name of the shared-string part, if the workbook has one.
    pub fn shared_strings_part_name(&self) -> Option<String> {
        if self.exists(SHARED_STRINGS_PART) {
            return Some(SHARED_STRINGS_PART.to_string());
        }
        let archive = self.archive.borrow();
        let found = archive
            .file_names()
            .find(|name| name.ends_with("/sharedStrings.xml"))
            .map(String::from);
        found
    }

    /// Read a part's raw bytes.
    pub fn read_part(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => Error::PartNotFound(name.to_string()),
            other => Error::from(other),
        })?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an XML part as a string, detecting UTF-8 / UTF-16 from the BOM.
    pub fn read_xml(&self, name: &str) -> Result<String> {
        let bytes = self.read_part(name)?;
        decode_xml_bytes(&bytes)
    }

    /// Check if a part exists in the archive.
    pub fn exists(&self, name: &str) -> bool {
        let archive = self.archive.borrow();
        let result = archive.file_names().any(|n| n == name);
        result
    }

    /// List all part names in the archive.
    pub fn list_files(&self) -> Vec<String> {
        let archive = self.archive.borrow();
        archive.file_names().map(String::from).collect()
    }
}

impl std::fmt::Debug for WorkbookArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkbookArchive")
            .field("files", &self.list_files().len())
            .finish()
    }
}
