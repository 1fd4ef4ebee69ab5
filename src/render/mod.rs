//! Output rendering for extracted rows.
//!
//! # Example
//!
//! ```no_run
//! use xlsparse::render::{DelimitedWriter, OutputMode};
//!
//! let rows = xlsparse::extract_rows("data.xlsx", 1)?;
//! let mut writer = DelimitedWriter::new(std::io::stdout().lock(), OutputMode::Tab);
//! writer.write_rows(rows)?;
//! # Ok::<(), xlsparse::Error>(())
//! ```

mod delimited;
mod encoding;
mod options;

pub use delimited::{format_field, format_row, DelimitedWriter};
pub use encoding::{encode_text, lookup_encoding};
pub use options::OutputMode;
