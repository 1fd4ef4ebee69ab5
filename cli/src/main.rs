//! xlsparse CLI - dump one worksheet of an XLSX workbook as delimited text.

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use colored::*;
use std::io;
use std::path::PathBuf;
use std::process;
use xlsparse::render::{DelimitedWriter, OutputMode};

const OUTPUT_TYPES: &str = "\
Output types:
  -c, --csv        csv with quotes where commas are included in the value (default)
  -p, --pipe       pipe-delimited fields, no special character handling
  -t, --tab        tab-delimited fields, no special characters
  -s, --sep <SEP>  delimit with contents of <SEP>";

/// Dump an XLSX worksheet as CSV, pipe, tab or custom-delimited text
#[derive(Parser, Debug)]
#[command(
    name = "xlsparse",
    author = "iyulab",
    version,
    about = "Dump an XLSX worksheet as delimited text",
    long_about = "xlsparse - print the rows of one worksheet of an XLSX workbook.\n\n\
                  Rows span the sheet's populated columns; empty cells print as empty fields.",
    after_help = OUTPUT_TYPES
)]
struct Cli {
    /// Target XLSX file
    target: PathBuf,

    /// Sheet number (N in xl/worksheets/sheetN.xml)
    sheet: u32,

    /// Comma-separated, quoting values that contain a comma
    #[arg(short, long)]
    csv: bool,

    /// Pipe-separated, no quoting
    #[arg(short, long)]
    pipe: bool,

    /// Tab-separated, no quoting
    #[arg(short, long)]
    tab: bool,

    /// Custom separator, no quoting
    #[arg(short, long, value_name = "SEP", allow_hyphen_values = true)]
    sep: Option<String>,

    /// Encoding to re-encode a line into when the output rejects it
    ///
    /// Lines are written as UTF-8 and re-encoded only when the output fails a
    /// write as invalid data. Standard output accepts any UTF-8, so this
    /// rarely applies to a terminal or pipe. Output is line-buffered: a write
    /// error can surface on a later line or only when output is flushed.
    #[arg(short, long, value_name = "ENCODING")]
    decode: Option<String>,
}

impl Cli {
    /// Selected output mode; csv wins over pipe, pipe over tab, tab over sep.
    fn output_mode(&self) -> OutputMode {
        if self.csv {
            OutputMode::Csv
        } else if self.pipe {
            OutputMode::Pipe
        } else if self.tab {
            OutputMode::Tab
        } else if let Some(sep) = &self.sep {
            OutputMode::Separator(sep.clone())
        } else {
            OutputMode::Csv
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => process::exit(report_usage_error(&e)),
    };

    if let Err(e) = run(&cli) {
        if is_broken_pipe(&e) {
            return;
        }
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> xlsparse::Result<()> {
    let rows = xlsparse::extract_rows(&cli.target, cli.sheet)?;

    let mut writer = DelimitedWriter::new(io::stdout().lock(), cli.output_mode());
    if let Some(label) = &cli.decode {
        writer = writer.with_fallback_encoding(label)?;
    }
    writer.write_rows(rows)?;
    writer.flush()
}

/// Print a clap error and return the process exit code.
///
/// Help and version requests exit 0; every argument problem exits 1.
fn report_usage_error(e: &clap::Error) -> i32 {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = e.print();
            0
        }
        _ if sheet_not_integer(e) => {
            eprintln!("{}", "ERROR: second arg (sheet) must be an integer".red());
            eprintln!();
            eprintln!("{}", Cli::command().render_usage());
            eprintln!();
            eprintln!("{OUTPUT_TYPES}");
            1
        }
        _ => {
            let _ = e.print();
            1
        }
    }
}

/// Check if the error is about the `<SHEET>` argument's value.
fn sheet_not_integer(e: &clap::Error) -> bool {
    matches!(e.kind(), ErrorKind::ValueValidation | ErrorKind::InvalidValue)
        && matches!(
            e.get(ContextKind::InvalidArg),
            Some(ContextValue::String(arg)) if arg == "<SHEET>"
        )
}

fn is_broken_pipe(e: &xlsparse::Error) -> bool {
    matches!(e, xlsparse::Error::Io(io_err) if io_err.kind() == io::ErrorKind::BrokenPipe)
}
