//! XLSX (Excel) worksheet extraction.
//!
//! # Example
//!
//! ```no_run
//! use xlsparse::xlsx::XlsxParser;
//!
//! let parser = XlsxParser::open("spreadsheet.xlsx")?;
//! for sheet in parser.sheet_ids() {
//!     let cells = parser.cells(sheet)?;
//!     println!("sheet{sheet}: {} cells", cells.len());
//! }
//! # Ok::<(), xlsparse::Error>(())
//! ```

mod parser;
mod shared_strings;
mod worksheet;

pub use parser::{XlsxFile, XlsxParser};
pub use shared_strings::SharedStrings;
pub use worksheet::{normalize_line_breaks, SheetCells, LINE_BREAK_PLACEHOLDER};
