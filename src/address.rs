//! Cell address codec.
//!
//! Converts A1-style references (`"B10"`) to zero-indexed coordinates and back.
//! Column letters are a bijective base-26 numeral: `A`=1 .. `Z`=26 with no zero
//! digit, so `A` is column 0, `Z` is 25 and `AA` is 26.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Zero-indexed cell position within a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Column index (`A` = 0)
    pub col: u32,
    /// Row index (row `1` = 0)
    pub row: u32,
}

impl Coordinate {
    /// Create a coordinate from zero-indexed column and row.
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Render the coordinate back to an A1-style address.
    pub fn to_address(&self) -> String {
        format!("{}{}", column_name(self.col), u64::from(self.row) + 1)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_address())
    }
}

impl FromStr for Coordinate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// Decode an A1-style address into a [`Coordinate`].
///
/// The address must be one or more uppercase ASCII letters followed by one or
/// more digits, with a row number of at least 1.
///
/// # Example
///
/// ```
/// use xlsparse::address::{decode, Coordinate};
///
/// assert_eq!(decode("AA1")?, Coordinate::new(26, 0));
/// assert_eq!(decode("B10")?, Coordinate::new(1, 9));
/// # Ok::<(), xlsparse::Error>(())
/// ```
pub fn decode(address: &str) -> Result<Coordinate> {
    let malformed = || Error::MalformedAddress(address.to_string());

    let bytes = address.as_bytes();
    let split = bytes
        .iter()
        .position(|b| !b.is_ascii_uppercase())
        .ok_or_else(malformed)?;
    let (letters, digits) = bytes.split_at(split);
    if letters.is_empty() || digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(malformed());
    }

    let mut col: u32 = 0;
    for &c in letters {
        col = col
            .checked_mul(26)
            .and_then(|v| v.checked_add(u32::from(c - b'A') + 1))
            .ok_or_else(malformed)?;
    }

    let mut row: u32 = 0;
    for &d in digits {
        row = row
            .checked_mul(10)
            .and_then(|v| v.checked_add(u32::from(d - b'0')))
            .ok_or_else(malformed)?;
    }
    if row == 0 {
        return Err(malformed());
    }

    Ok(Coordinate::new(col - 1, row - 1))
}

/// Spreadsheet column name for a zero-indexed column (`0` -> `"A"`, `26` -> `"AA"`).
pub fn column_name(col: u32) -> String {
    let mut n = u64::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
