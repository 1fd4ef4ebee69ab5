//! Worksheet cell extraction.

use crate::address::{self, Coordinate};
use crate::error::{Error, Result};
use crate::xml::{self, NameMatch};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use std::collections::hash_map;
use std::collections::HashMap;

use super::shared_strings::SharedStrings;

/// Placeholder that replaces line breaks inside shared-string values.
pub const LINE_BREAK_PLACEHOLDER: char = '^';

/// Sparse cell values of one worksheet, keyed by coordinate.
///
/// The column extremes are tracked while cells are inserted so rows can be
/// densified without a second scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetCells {
    cells: HashMap<Coordinate, String>,
    min_col: u32,
    max_col: u32,
}

impl SheetCells {
    /// Create an empty cell map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a worksheet part, resolving shared-string cells against `shared`.
    pub fn parse(xml: &str, shared: &SharedStrings) -> Result<Self> {
        let cells = xml::parse_with_fallback(xml, "worksheet", |names| {
            parse_cells(xml, names, shared)
        })?;
        debug!("extracted {} cells", cells.len());
        Ok(cells)
    }

    /// Insert a value, replacing any earlier value at the same coordinate.
    pub fn insert(&mut self, coord: Coordinate, value: String) {
        if self.cells.is_empty() {
            self.min_col = coord.col;
            self.max_col = coord.col;
        } else {
            self.min_col = self.min_col.min(coord.col);
            self.max_col = self.max_col.max(coord.col);
        }
        self.cells.insert(coord, value);
    }

    /// Value at a coordinate.
    pub fn get(&self, coord: Coordinate) -> Option<&str> {
        self.cells.get(&coord).map(String::as_str)
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cell was populated.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Smallest and largest populated column, or `None` for an empty sheet.
    pub fn column_bounds(&self) -> Option<(u32, u32)> {
        if self.cells.is_empty() {
            None
        } else {
            Some((self.min_col, self.max_col))
        }
    }

    /// Iterate over populated cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &str)> {
        self.cells.iter().map(|(coord, value)| (*coord, value.as_str()))
    }
}

impl IntoIterator for SheetCells {
    type Item = (Coordinate, String);
    type IntoIter = hash_map::IntoIter<Coordinate, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

/// Replace `\r\n` and `\n` with [`LINE_BREAK_PLACEHOLDER`].
pub fn normalize_line_breaks(value: &str) -> String {
    value
        .replace("\r\n", "\n")
        .replace('\n', &LINE_BREAK_PLACEHOLDER.to_string())
}

/// Declared cell type (`t` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    /// `t="s"`: value is an index into the shared-string table
    Shared,
    /// `t="inlineStr"`: text lives in an `<is>` child
    Inline,
    /// Absent or any other type: value text is used verbatim
    Literal,
}

impl CellKind {
    fn from_attr(value: &[u8]) -> Self {
        match value {
            b"s" => CellKind::Shared,
            b"inlineStr" => CellKind::Inline,
            _ => CellKind::Literal,
        }
    }
}

/// A `<c>` element whose end tag has not been reached yet.
#[derive(Debug)]
struct PendingCell {
    coord: Coordinate,
    kind: CellKind,
    value: Option<String>,
}

impl PendingCell {
    fn resolve(self, shared: &SharedStrings) -> Result<(Coordinate, String)> {
        let value = match (self.kind, self.value) {
            (_, None) => String::new(),
            (CellKind::Shared, Some(raw)) => {
                let index = raw.trim().parse::<usize>().map_err(|_| {
                    Error::XmlParse(format!(
                        "cell {}: invalid shared string index {raw:?}",
                        self.coord
                    ))
                })?;
                normalize_line_breaks(shared.get(index)?)
            }
            (_, Some(raw)) => raw,
        };
        Ok((self.coord, value))
    }
}

/// Where character data currently goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    InlineText,
}

fn parse_cells(
    xml: &str,
    names: &NameMatch,
    shared: &SharedStrings,
) -> Result<(SheetCells, usize)> {
    let mut reader = xml::reader(xml);
    let mut cells = SheetCells::new();
    let mut matched = 0usize;
    let mut buf = Vec::new();

    let mut row_index: Option<RowIndex> = None;
    let mut next_col = 0u32;
    let mut pending: Option<PendingCell> = None;
    let mut in_inline = false;
    let mut phonetic_depth = 0usize;
    let mut target = TextTarget::None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                if names.is(name, b"row") {
                    row_index = Some(row_start(&e, row_index.as_ref())?);
                    next_col = 0;
                } else if names.is(name, b"c") {
                    let row = row_index.as_ref().unwrap_or(&RowIndex::Known(0));
                    let (coord, kind) = cell_start(&e, next_col, row)?;
                    next_col = coord.col.saturating_add(1);
                    matched += 1;
                    pending = Some(PendingCell {
                        coord,
                        kind,
                        value: None,
                    });
                } else if let Some(cell) = pending.as_mut() {
                    if names.is(name, b"v") && !in_inline {
                        cell.value.get_or_insert_with(String::new);
                        target = TextTarget::Value;
                    } else if names.is(name, b"is") {
                        in_inline = true;
                        cell.value.get_or_insert_with(String::new);
                    } else if in_inline && names.is(name, b"rPh") {
                        phonetic_depth += 1;
                    } else if in_inline && phonetic_depth == 0 && names.is(name, b"t") {
                        target = TextTarget::InlineText;
                    }
                }
            }
            Event::Text(e) if target != TextTarget::None => {
                if let Some(value) = pending.as_mut().and_then(|c| c.value.as_mut()) {
                    value.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) if target != TextTarget::None => {
                if let Some(value) = pending.as_mut().and_then(|c| c.value.as_mut()) {
                    value.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = e.name();
                if names.is(name, b"c") {
                    if let Some(cell) = pending.take() {
                        let (coord, value) = cell.resolve(shared)?;
                        cells.insert(coord, value);
                    }
                    in_inline = false;
                    phonetic_depth = 0;
                    target = TextTarget::None;
                } else if names.is(name, b"v") || names.is(name, b"t") {
                    target = TextTarget::None;
                } else if names.is(name, b"rPh") {
                    phonetic_depth = phonetic_depth.saturating_sub(1);
                } else if names.is(name, b"is") {
                    in_inline = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((cells, matched))
}

/// Row number of a `<row>` element as far as it could be determined.
///
/// An unusable `r` only matters for cells that omit their own `r`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowIndex {
    Known(u32),
    Invalid(String),
}

/// Row index for a `<row>` element; rows without `r` follow the previous row.
fn row_start(e: &BytesStart<'_>, previous: Option<&RowIndex>) -> Result<RowIndex> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"r" {
            let raw = attr.unescape_value()?;
            let index = raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(|r| r.checked_sub(1))
                .map_or_else(|| RowIndex::Invalid(raw.to_string()), RowIndex::Known);
            return Ok(index);
        }
    }
    Ok(match previous {
        None => RowIndex::Known(0),
        Some(RowIndex::Known(r)) => RowIndex::Known(r.saturating_add(1)),
        Some(invalid) => invalid.clone(),
    })
}

/// Coordinate and type of a `<c>` element.
///
/// A missing `r` attribute places the cell right after the previous cell of
/// the same row, which requires the row number to be known.
fn cell_start(
    e: &BytesStart<'_>,
    next_col: u32,
    row: &RowIndex,
) -> Result<(Coordinate, CellKind)> {
    let mut coord = None;
    let mut kind = CellKind::Literal;
    for attr in e.attributes() {
        let attr = attr?;
        match attr.key.as_ref() {
            b"r" => coord = Some(address::decode(&attr.unescape_value()?)?),
            b"t" => kind = CellKind::from_attr(&attr.value),
            _ => {}
        }
    }
    let coord = match (coord, row) {
        (Some(coord), _) => coord,
        (None, RowIndex::Known(row)) => Coordinate::new(next_col, *row),
        (None, RowIndex::Invalid(raw)) => {
            return Err(Error::XmlParse(format!(
                "cell without reference in row with invalid number {raw:?}"
            )));
        }
    };
    Ok((coord, kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

    fn sheet(body: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{NS}"><sheetData>{body}</sheetData></worksheet>"#)
    }

    fn shared(strings: &[&str]) -> SharedStrings {
        SharedStrings::from_strings(strings.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_literal_and_shared_cells() {
        let xml = sheet(
            r#"<row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1"><v>42.5</v></c></row>
               <row r="2"><c r="A2" t="s"><v>0</v></c><c r="C2" t="b"><v>1</v></c></row>"#,
        );
        let cells = SheetCells::parse(&xml, &shared(&["zero", "one"])).unwrap();

        assert_eq!(cells.len(), 4);
        assert_eq!(cells.get(Coordinate::new(0, 0)), Some("one"));
        assert_eq!(cells.get(Coordinate::new(1, 0)), Some("42.5"));
        assert_eq!(cells.get(Coordinate::new(0, 1)), Some("zero"));
        assert_eq!(cells.get(Coordinate::new(2, 1)), Some("1"));
        assert_eq!(cells.column_bounds(), Some((0, 2)));
    }

    #[test]
    fn test_cell_without_value_is_empty() {
        let xml = sheet(r#"<row r="3"><c r="D3" s="2"/><c r="E3" t="s" s="1"></c></row>"#);
        let cells = SheetCells::parse(&xml, &SharedStrings::default()).unwrap();

        assert_eq!(cells.get(Coordinate::new(3, 2)), Some(""));
        assert_eq!(cells.get(Coordinate::new(4, 2)), Some(""));
    }

    #[test]
    fn test_line_breaks_normalized_for_shared_strings_only() {
        let xml = sheet(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="str"><v>raw
text</v></c><c r="C1" t="s"><v>1</v></c></row>"#,
        );
        let cells = SheetCells::parse(&xml, &shared(&["line1\nline2", "a\r\nb\nc"])).unwrap();

        assert_eq!(cells.get(Coordinate::new(0, 0)), Some("line1^line2"));
        assert_eq!(cells.get(Coordinate::new(1, 0)), Some("raw\ntext"));
        assert_eq!(cells.get(Coordinate::new(2, 0)), Some("a^b^c"));
    }

    #[test]
    fn test_shared_index_out_of_range_is_fatal() {
        let xml = sheet(r#"<row r="1"><c r="A1" t="s"><v>5</v></c></row>"#);
        let result = SheetCells::parse(&xml, &shared(&["only"]));
        assert!(matches!(
            result,
            Err(Error::SharedStringIndex { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_shared_index_not_a_number() {
        let xml = sheet(r#"<row r="1"><c r="A1" t="s"><v>abc</v></c></row>"#);
        let result = SheetCells::parse(&xml, &shared(&["only"]));
        assert!(matches!(result, Err(Error::XmlParse(_))));
    }

    #[test]
    fn test_malformed_address() {
        let xml = sheet(r#"<row r="1"><c r="a1"><v>1</v></c></row>"#);
        let result = SheetCells::parse(&xml, &SharedStrings::default());
        assert!(matches!(result, Err(Error::MalformedAddress(_))));
    }

    #[test]
    fn test_duplicate_coordinate_last_wins() {
        let xml = sheet(r#"<row r="1"><c r="A1"><v>first</v></c><c r="A1"><v>second</v></c></row>"#);
        let cells = SheetCells::parse(&xml, &SharedStrings::default()).unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells.get(Coordinate::new(0, 0)), Some("second"));
    }

    #[test]
    fn test_inline_string() {
        let xml = sheet(
            r#"<row r="1"><c r="B1" t="inlineStr"><is><r><t>in</t></r><r><t xml:space="preserve">line </t></r></is></c></row>"#,
        );
        let cells = SheetCells::parse(&xml, &SharedStrings::default()).unwrap();
        assert_eq!(cells.get(Coordinate::new(1, 0)), Some("inline "));
    }

    #[test]
    fn test_formula_text_ignored() {
        let xml = sheet(r#"<row r="1"><c r="A1"><f>SUM(B1:B2)</f><v>3</v></c></row>"#);
        let cells = SheetCells::parse(&xml, &SharedStrings::default()).unwrap();
        assert_eq!(cells.get(Coordinate::new(0, 0)), Some("3"));
    }

    #[test]
    fn test_missing_references_are_inferred() {
        let xml = sheet(
            r#"<row r="4"><c><v>a</v></c><c r="C4"><v>c</v></c><c><v>d</v></c></row>
               <row><c><v>next</v></c></row>"#,
        );
        let cells = SheetCells::parse(&xml, &SharedStrings::default()).unwrap();
        assert_eq!(cells.get(Coordinate::new(0, 3)), Some("a"));
        assert_eq!(cells.get(Coordinate::new(2, 3)), Some("c"));
        assert_eq!(cells.get(Coordinate::new(3, 3)), Some("d"));
        assert_eq!(cells.get(Coordinate::new(0, 4)), Some("next"));
    }

    #[test]
    fn test_invalid_row_number_ignored_when_cells_have_references() {
        let xml = sheet(r#"<row r="x"><c r="A1"><v>1</v></c><c r="B1"><v>2</v></c></row>"#);
        let cells = SheetCells::parse(&xml, &SharedStrings::default()).unwrap();
        assert_eq!(cells.get(Coordinate::new(0, 0)), Some("1"));
        assert_eq!(cells.get(Coordinate::new(1, 0)), Some("2"));
    }

    #[test]
    fn test_invalid_row_number_fails_when_position_is_inferred() {
        let xml = sheet(r#"<row r="x"><c r="A1"><v>1</v></c><c><v>2</v></c></row>"#);
        let result = SheetCells::parse(&xml, &SharedStrings::default());
        assert!(matches!(result, Err(Error::XmlParse(_))));

        // the following row cannot be numbered either
        let xml = sheet(r#"<row r="0"><c r="A1"><v>1</v></c></row><row><c><v>2</v></c></row>"#);
        let result = SheetCells::parse(&xml, &SharedStrings::default());
        assert!(matches!(result, Err(Error::XmlParse(_))));
    }

    #[test]
    fn test_prefixed_namespace_fallback() {
        let xml = format!(
            r#"<x:worksheet xmlns:x="{NS}"><x:sheetData><x:row r="2"><x:c r="B2" t="s"><x:v>0</x:v></x:c><x:c r="C2"><x:v>7</x:v></x:c></x:row></x:sheetData></x:worksheet>"#
        );
        let cells = SheetCells::parse(&xml, &shared(&["hi"])).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells.get(Coordinate::new(1, 1)), Some("hi"));
        assert_eq!(cells.get(Coordinate::new(2, 1)), Some("7"));
    }

    #[test]
    fn test_empty_sheet() {
        let cells = SheetCells::parse(&sheet(""), &SharedStrings::default()).unwrap();
        assert!(cells.is_empty());
        assert_eq!(cells.column_bounds(), None);
    }

    #[test]
    fn test_insert_tracks_bounds() {
        let mut cells = SheetCells::new();
        cells.insert(Coordinate::new(4, 0), "y".into());
        cells.insert(Coordinate::new(2, 7), "x".into());
        assert_eq!(cells.column_bounds(), Some((2, 4)));
    }
}
