//! Output mode configuration.

/// How rows are delimited on output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Comma-separated; fields containing a comma are quoted
    #[default]
    Csv,
    /// Pipe-separated, fields written verbatim
    Pipe,
    /// Tab-separated, fields written verbatim
    Tab,
    /// Custom separator, fields written verbatim
    Separator(String),
}

impl OutputMode {
    /// Field delimiter for this mode.
    pub fn delimiter(&self) -> &str {
        match self {
            OutputMode::Csv => ",",
            OutputMode::Pipe => "|",
            OutputMode::Tab => "\t",
            OutputMode::Separator(sep) => sep,
        }
    }

    /// Whether fields that contain the delimiter get quoted.
    pub fn quotes_fields(&self) -> bool {
        matches!(self, OutputMode::Csv)
    }
}
