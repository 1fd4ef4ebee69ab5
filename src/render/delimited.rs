//! Delimited text renderer.
//!
//! Quoting is deliberately simple: in CSV mode a field that contains the
//! delimiter is wrapped in double quotes and its inner quotes become `\"`.
//! Quotes are not doubled as RFC 4180 would, and fields without the delimiter
//! are left alone. Other modes join fields verbatim, so a separator inside a
//! field is not escaped.

use crate::error::Result;
use crate::rows::Row;
use encoding_rs::Encoding;
use log::warn;
use std::borrow::Cow;
use std::io::{self, Write};

use super::encoding::{encode_text, lookup_encoding};
use super::options::OutputMode;

/// Render one field, quoting it when required.
pub fn format_field<'a>(field: &'a str, mode: &OutputMode) -> Cow<'a, str> {
    let delimiter = mode.delimiter();
    if mode.quotes_fields() && field.contains(delimiter) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\\\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Render a row as one line of text, without a line terminator.
///
/// # Example
///
/// ```
/// use xlsparse::render::{format_row, OutputMode};
///
/// let row = vec!["a,b".to_string(), "c".to_string()];
/// assert_eq!(format_row(&row, &OutputMode::Csv), "\"a,b\",c");
/// assert_eq!(format_row(&row, &OutputMode::Pipe), "a,b|c");
/// ```
pub fn format_row<S: AsRef<str>>(row: &[S], mode: &OutputMode) -> String {
    let mut line = String::new();
    for (i, field) in row.iter().enumerate() {
        if i > 0 {
            line.push_str(mode.delimiter());
        }
        line.push_str(&format_field(field.as_ref(), mode));
    }
    line
}

/// Writes rows as delimited lines to an output sink.
pub struct DelimitedWriter<W: Write> {
    out: W,
    mode: OutputMode,
    fallback: Option<&'static Encoding>,
}

impl<W: Write> DelimitedWriter<W> {
    /// Create a writer for the given mode.
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            fallback: None,
        }
    }

    /// Re-encode lines into `label` when the sink rejects them as invalid data.
    ///
    /// Only a sink that fails a write with [`io::ErrorKind::InvalidData`]
    /// triggers this; `std::io::Stdout` accepts any UTF-8. With a buffered sink
    /// the error may belong to an earlier line or show up at [`flush`](Self::flush).
    pub fn with_fallback_encoding(mut self, label: &str) -> Result<Self> {
        self.fallback = Some(lookup_encoding(label)?);
        Ok(self)
    }

    /// Get the output mode.
    pub fn mode(&self) -> &OutputMode {
        &self.mode
    }

    /// Write one row followed by a newline.
    pub fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        let mut line = format_row(row, &self.mode);
        line.push('\n');

        match self.out.write_all(line.as_bytes()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::InvalidData => match self.fallback {
                Some(encoding) => {
                    warn!("output rejected line ({e}), re-encoding as {}", encoding.name());
                    self.out.write_all(&encode_text(encoding, &line))?;
                    Ok(())
                }
                None => Err(e.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Write every row, returning how many were written.
    pub fn write_rows<I>(&mut self, rows: I) -> Result<usize>
    where
        I: IntoIterator<Item = Row>,
    {
        let mut count = 0;
        for row in rows {
            self.write_row(&row)?;
            count += 1;
        }
        Ok(count)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Unwrap the underlying sink.
    pub fn into_inner(self) -> W {
        self.out
    }
}
