//! # xlsparse
//!
//! Extract worksheet rows from XLSX workbooks and write them as delimited text.
//!
//! A workbook is a ZIP archive of XML parts. Extraction reads the shared-string
//! table, walks the cells of one `worksheets/sheetN.xml` part and rebuilds
//! equal-length rows spanning the sheet's populated columns.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xlsparse::render::{DelimitedWriter, OutputMode};
//!
//! // Sheet identifiers present in the workbook
//! let sheets = xlsparse::sheet_ids("data.xlsx")?;
//!
//! // Rows of the first sheet, as CSV on stdout
//! let rows = xlsparse::extract_rows("data.xlsx", sheets[0])?;
//! let mut writer = DelimitedWriter::new(std::io::stdout().lock(), OutputMode::Csv);
//! writer.write_rows(rows)?;
//! # Ok::<(), xlsparse::Error>(())
//! ```
//!
//! ## Cells with exact coordinates
//!
//! Rows are shifted so the leftmost populated column comes first. Use
//! [`XlsxFile::cells`] to see the original coordinates:
//!
//! ```no_run
//! use xlsparse::XlsxFile;
//!
//! let cells = XlsxFile::new("data.xlsx").cells(1)?;
//! for (coord, value) in cells.iter() {
//!     println!("{coord} = {value}");
//! }
//! # Ok::<(), xlsparse::Error>(())
//! ```

pub mod address;
pub mod container;
pub mod error;
pub mod render;
pub mod rows;
pub mod xlsx;

mod xml;

// Re-exports
pub use address::{decode, Coordinate};
pub use container::WorkbookArchive;
pub use error::{Error, Result};
pub use rows::{IndexedRows, Row, Rows};
pub use xlsx::{SharedStrings, SheetCells, XlsxFile, XlsxParser};

use std::path::Path;

/// Sorted worksheet identifiers of a workbook file.
///
/// # Example
///
/// ```no_run
/// let sheets = xlsparse::sheet_ids("data.xlsx")?;
/// println!("{sheets:?}");
/// # Ok::<(), xlsparse::Error>(())
/// ```
pub fn sheet_ids(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    XlsxFile::new(path.as_ref()).sheets()
}

/// Extract the dense rows of worksheet `sheet_id` from a workbook file.
///
/// The archive is opened, read and released before this returns.
pub fn extract_rows(path: impl AsRef<Path>, sheet_id: u32) -> Result<Rows> {
    XlsxFile::new(path.as_ref()).rows(sheet_id)
}

/// Extract the dense rows of worksheet `sheet_id` from workbook bytes.
pub fn extract_rows_from_bytes(data: &[u8], sheet_id: u32) -> Result<Rows> {
    XlsxParser::from_bytes(data.to_vec())?.rows(sheet_id)
}
