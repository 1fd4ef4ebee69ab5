//! Error types for the xlsparse library.

use std::io;
use thiserror::Error;

/// Result type alias for xlsparse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while extracting a worksheet.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The container could not be read as a ZIP archive.
    #[error("Invalid archive: {0}")]
    ArchiveFormat(String),

    /// A required part is missing from the archive.
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// No worksheet part matches the requested sheet identifier.
    #[error("Sheet not found: {0}")]
    SheetNotFound(u32),

    /// A cell address does not match `[A-Z]+[0-9]+`.
    #[error("Malformed cell address: {0:?}")]
    MalformedAddress(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A shared-string reference points past the end of the table.
    #[error("Shared string index {index} out of range (table has {len} entries)")]
    SharedStringIndex {
        /// Index found in the cell
        index: usize,
        /// Number of loaded shared strings
        len: usize,
    },

    /// The populated column range is wider than a worksheet can be.
    #[error("Sheet spans {width} columns (limit is {max})")]
    SheetTooWide {
        /// `max_col - min_col + 1` of the populated cells
        width: u64,
        /// Largest accepted row width
        max: u64,
    },

    /// Invalid caller-supplied argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ArchiveFormat(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
