//! XLSX extraction: archive -> shared strings -> worksheet cells -> rows.

use crate::container::WorkbookArchive;
use crate::error::{Error, Result};
use crate::rows::Rows;
use log::debug;
use std::path::{Path, PathBuf};

use super::shared_strings::SharedStrings;
use super::worksheet::SheetCells;

/// An opened workbook with its shared-string table loaded.
///
/// Dropping the parser releases the archive.
#[derive(Debug)]
pub struct XlsxParser {
    container: WorkbookArchive,
    shared_strings: SharedStrings,
}

impl XlsxParser {
    /// Open an XLSX file for parsing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let container = WorkbookArchive::open(path)?;
        Self::from_container(container)
    }

    /// Create a parser from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let container = WorkbookArchive::from_bytes(data)?;
        Self::from_container(container)
    }

    /// Create a parser from a container, loading the shared-string table.
    ///
    /// A workbook without a shared-string part gets an empty table.
    pub fn from_container(container: WorkbookArchive) -> Result<Self> {
        let shared_strings = match container.shared_strings_part_name() {
            Some(part) => SharedStrings::parse(&container.read_xml(&part)?)?,
            None => {
                debug!("workbook has no shared-string part");
                SharedStrings::default()
            }
        };

        Ok(Self {
            container,
            shared_strings,
        })
    }

    /// Sorted identifiers of the worksheets in the workbook.
    pub fn sheet_ids(&self) -> Vec<u32> {
        self.container.list_sheet_ids().into_iter().collect()
    }

    /// Sparse cells of worksheet `sheet_id`.
    pub fn cells(&self, sheet_id: u32) -> Result<SheetCells> {
        if sheet_id == 0 {
            return Err(Error::InvalidArgument(
                "sheet identifiers start at 1".to_string(),
            ));
        }
        let part = self.container.worksheet_part_name(sheet_id)?;
        debug!("reading worksheet {sheet_id} from {part}");
        let xml = self.container.read_xml(&part)?;
        SheetCells::parse(&xml, &self.shared_strings)
    }

    /// Dense rows of worksheet `sheet_id`.
    pub fn rows(&self, sheet_id: u32) -> Result<Rows> {
        Rows::new(self.cells(sheet_id)?)
    }

    /// Get the loaded shared-string table.
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Get a reference to the container.
    pub fn container(&self) -> &WorkbookArchive {
        &self.container
    }
}

/// A workbook on disk, re-read from scratch by every call.
///
/// Each operation opens the archive, does its work and releases the archive
/// before returning, so calls are independent and repeatable.
///
/// # Example
///
/// ```no_run
/// use xlsparse::XlsxFile;
///
/// let file = XlsxFile::new("report.xlsx");
/// for sheet in file.sheets()? {
///     for row in file.rows(sheet)? {
///         println!("{}", row.join(","));
///     }
/// }
/// # Ok::<(), xlsparse::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxFile {
    target: PathBuf,
}

impl XlsxFile {
    /// Target a workbook file. Nothing is opened yet.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    /// Path of the targeted workbook.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Sorted worksheet identifiers.
    pub fn sheets(&self) -> Result<Vec<u32>> {
        let container = WorkbookArchive::open(&self.target)?;
        Ok(container.list_sheet_ids().into_iter().collect())
    }

    /// Sparse cells of a worksheet, with exact sheet coordinates.
    pub fn cells(&self, sheet_id: u32) -> Result<SheetCells> {
        XlsxParser::open(&self.target)?.cells(sheet_id)
    }

    /// Dense rows of a worksheet.
    pub fn rows(&self, sheet_id: u32) -> Result<Rows> {
        XlsxParser::open(&self.target)?.rows(sheet_id)
    }
}
