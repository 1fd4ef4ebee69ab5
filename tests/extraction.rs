//! End-to-end extraction tests over synthetic workbooks.
//!
//! Run with: cargo test --test extraction

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use tempfile::TempDir;
use xlsparse::render::{DelimitedWriter, OutputMode};
use xlsparse::{Coordinate, Error, XlsxFile};
use zip::write::SimpleFileOptions;

const NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Zip the given parts into an in-memory workbook.
fn build_workbook(parts: &[(&str, String)]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, xml) in parts {
            zip.start_file(*name, options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}

fn write_workbook(dir: &TempDir, parts: &[(&str, String)]) -> PathBuf {
    let path = dir.path().join("book.xlsx");
    std::fs::write(&path, build_workbook(parts)).unwrap();
    path
}

fn shared_strings(items: &[&str]) -> String {
    let body: String = items.iter().map(|item| format!("<si>{item}</si>")).collect();
    format!(r#"<?xml version="1.0" encoding="UTF-8"?><sst xmlns="{NS}">{body}</sst>"#)
}

fn worksheet(rows: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{NS}"><dimension ref="C2:E4"/><sheetData>{rows}</sheetData></worksheet>"#
    )
}

fn sample_parts() -> Vec<(&'static str, String)> {
    vec![
        (
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#
                .to_string(),
        ),
        (
            "xl/sharedStrings.xml",
            shared_strings(&[
                "<t>Name</t>",
                "<r><t>Hel</t></r><r><t>lo</t></r>",
                "<t>two\nlines</t>",
                "<t>a,b</t>",
            ]),
        ),
        (
            "xl/worksheets/sheet1.xml",
            worksheet(
                r#"<row r="2"><c r="C2" t="s"><v>0</v></c><c r="E2"><v>10</v></c></row>
                   <row r="3"><c r="C3" t="s"><v>1</v></c><c r="D3" s="4"/><c r="E3" t="s"><v>2</v></c></row>
                   <row r="4"><c r="D4" t="s"><v>3</v></c></row>"#,
            ),
        ),
        ("xl/worksheets/sheet3.xml", worksheet("")),
    ]
}

fn render(rows: xlsparse::Rows, mode: OutputMode) -> String {
    let mut writer = DelimitedWriter::new(Vec::new(), mode);
    writer.write_rows(rows).unwrap();
    String::from_utf8(writer.into_inner()).unwrap()
}

#[test]
fn test_sheet_ids_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());

    assert_eq!(xlsparse::sheet_ids(&path).unwrap(), vec![1, 3]);
    assert_eq!(XlsxFile::new(&path).sheets().unwrap(), vec![1, 3]);
}

#[test]
fn test_rows_are_dense_and_offset() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());

    let rows: Vec<Vec<String>> = xlsparse::extract_rows(&path, 1).unwrap().collect();
    assert_eq!(
        rows,
        vec![
            vec!["Name".to_string(), String::new(), "10".to_string()],
            vec!["Hello".to_string(), String::new(), "two^lines".to_string()],
            vec![String::new(), "a,b".to_string(), String::new()],
        ]
    );
}

#[test]
fn test_cells_keep_sheet_coordinates() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());

    let cells = XlsxFile::new(&path).cells(1).unwrap();
    assert_eq!(cells.len(), 6);
    assert_eq!(cells.get(Coordinate::new(2, 1)), Some("Name"));
    assert_eq!(cells.get(Coordinate::new(3, 2)), Some(""));
    assert_eq!(cells.get(Coordinate::new(3, 3)), Some("a,b"));
    assert_eq!(cells.column_bounds(), Some((2, 4)));
}

#[test]
fn test_csv_output() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());

    let rows = xlsparse::extract_rows(&path, 1).unwrap();
    assert_eq!(
        render(rows, OutputMode::Csv),
        "Name,,10\nHello,,two^lines\n,\"a,b\",\n"
    );

    let rows = xlsparse::extract_rows(&path, 1).unwrap();
    assert_eq!(
        render(rows, OutputMode::Pipe),
        "Name||10\nHello||two^lines\n|a,b|\n"
    );
}

#[test]
fn test_empty_sheet_yields_no_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());

    assert_eq!(xlsparse::extract_rows(&path, 3).unwrap().count(), 0);
}

#[test]
fn test_extraction_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());
    let file = XlsxFile::new(&path);

    let first: HashSet<Vec<String>> = file.rows(1).unwrap().collect();
    let second: HashSet<Vec<String>> = file.rows(1).unwrap().collect();
    assert_eq!(first, second);
    assert_eq!(file.cells(1).unwrap(), file.cells(1).unwrap());
}

#[test]
fn test_missing_shared_strings_part() {
    let parts = vec![(
        "xl/worksheets/sheet1.xml",
        worksheet(r#"<row r="1"><c r="A1"><v>1</v></c><c r="B1" t="str"><v>x</v></c></row>"#),
    )];
    let data = build_workbook(&parts);

    let rows: Vec<Vec<String>> = xlsparse::extract_rows_from_bytes(&data, 1)
        .unwrap()
        .collect();
    assert_eq!(rows, vec![vec!["1".to_string(), "x".to_string()]]);

    let parts = vec![(
        "xl/worksheets/sheet1.xml",
        worksheet(r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>"#),
    )];
    let data = build_workbook(&parts);
    assert!(matches!(
        xlsparse::extract_rows_from_bytes(&data, 1),
        Err(Error::SharedStringIndex { index: 0, len: 0 })
    ));
}

#[test]
fn test_prefixed_parts() {
    let parts = vec![
        (
            "xl/sharedStrings.xml",
            format!(r#"<x:sst xmlns:x="{NS}"><x:si><x:t>prefixed</x:t></x:si></x:sst>"#),
        ),
        (
            "xl/worksheets/sheet2.xml",
            format!(
                r#"<x:worksheet xmlns:x="{NS}"><x:sheetData><x:row r="1"><x:c r="A1" t="s"><x:v>0</x:v></x:c><x:c r="B1"><x:v>2</x:v></x:c></x:row></x:sheetData></x:worksheet>"#
            ),
        ),
    ];
    let data = build_workbook(&parts);

    let rows: Vec<Vec<String>> = xlsparse::extract_rows_from_bytes(&data, 2)
        .unwrap()
        .collect();
    assert_eq!(rows, vec![vec!["prefixed".to_string(), "2".to_string()]]);
}

#[test]
fn test_error_kinds() {
    let dir = TempDir::new().unwrap();
    let path = write_workbook(&dir, &sample_parts());

    assert!(matches!(
        xlsparse::extract_rows(&path, 2),
        Err(Error::SheetNotFound(2))
    ));

    let missing = dir.path().join("missing.xlsx");
    assert!(matches!(xlsparse::extract_rows(&missing, 1), Err(Error::Io(_))));

    let garbage = dir.path().join("garbage.xlsx");
    std::fs::write(&garbage, b"not a zip archive").unwrap();
    assert!(matches!(
        xlsparse::extract_rows(&garbage, 1),
        Err(Error::ArchiveFormat(_))
    ));

    let parts = vec![(
        "xl/worksheets/sheet1.xml",
        worksheet(r#"<row r="1"><c r="1A"><v>1</v></c></row>"#),
    )];
    assert!(matches!(
        xlsparse::extract_rows_from_bytes(&build_workbook(&parts), 1),
        Err(Error::MalformedAddress(_))
    ));

    let parts = vec![(
        "xl/worksheets/sheet1.xml",
        "<worksheet><sheetData><row></sheetData></worksheet>".to_string(),
    )];
    assert!(matches!(
        xlsparse::extract_rows_from_bytes(&build_workbook(&parts), 1),
        Err(Error::XmlParse(_))
    ));
}

#[test]
fn test_oversized_column_range_is_rejected() {
    let parts = vec![(
        "xl/worksheets/sheet1.xml",
        worksheet(r#"<row r="1"><c r="A1"><v>1</v></c><c r="FXSHRXW1"><v>2</v></c></row>"#),
    )];
    let data = build_workbook(&parts);
    assert!(matches!(
        xlsparse::extract_rows_from_bytes(&data, 1),
        Err(Error::SheetTooWide { max: 16_384, .. })
    ));

    // the sparse cells are still available
    let cells = xlsparse::XlsxParser::from_bytes(data).unwrap().cells(1).unwrap();
    assert_eq!(cells.len(), 2);
}

#[test]
fn test_unusable_row_number_with_cell_references() {
    let parts = vec![(
        "xl/worksheets/sheet1.xml",
        worksheet(r#"<row r="x"><c r="A1"><v>1</v></c></row>"#),
    )];
    let rows: Vec<Vec<String>> = xlsparse::extract_rows_from_bytes(&build_workbook(&parts), 1)
        .unwrap()
        .collect();
    assert_eq!(rows, vec![vec!["1".to_string()]]);
}
