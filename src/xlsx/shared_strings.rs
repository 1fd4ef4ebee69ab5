//! XLSX shared strings parsing.

use crate::error::{Error, Result};
use crate::xml::{self, NameMatch};
use log::debug;
use quick_xml::events::Event;

/// Shared strings table.
#[derive(Debug, Clone, Default)]
pub struct SharedStrings {
    /// All strings in order
    strings: Vec<String>,
}

impl SharedStrings {
    /// Parse shared strings from XML content.
    ///
    /// Each `<si>` item becomes one entry: the concatenation of its text runs
    /// (`<si><t>` or rich-text `<si><r><t>`). Phonetic guides (`<rPh>`) are
    /// not part of the cell text and are skipped.
    pub fn parse(xml: &str) -> Result<Self> {
        let strings = xml::parse_with_fallback(xml, "sharedStrings", |names| {
            let strings = parse_items(xml, names)?;
            let count = strings.len();
            Ok((strings, count))
        })?;
        debug!("loaded {} shared strings", strings.len());
        Ok(Self { strings })
    }

    /// Build a table from already-resolved strings.
    pub fn from_strings(strings: Vec<String>) -> Self {
        Self { strings }
    }

    /// Get a string by index.
    pub fn get(&self, index: usize) -> Result<&str> {
        self.strings
            .get(index)
            .map(String::as_str)
            .ok_or(Error::SharedStringIndex {
                index,
                len: self.strings.len(),
            })
    }

    /// Get the count of shared strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over the strings in table order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

fn parse_items(xml: &str, names: &NameMatch) -> Result<Vec<String>> {
    let mut reader = xml::reader(xml);
    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = e.name();
                if names.is(name, b"si") {
                    current = Some(String::new());
                } else if current.is_some() && names.is(name, b"rPh") {
                    phonetic_depth += 1;
                } else if current.is_some() && phonetic_depth == 0 && names.is(name, b"t") {
                    in_t = true;
                }
            }
            Event::Text(e) if in_t => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) if in_t => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                let name = e.name();
                if names.is(name, b"si") {
                    if let Some(text) = current.take() {
                        strings.push(text);
                    }
                    phonetic_depth = 0;
                    in_t = false;
                } else if names.is(name, b"rPh") {
                    phonetic_depth = phonetic_depth.saturating_sub(1);
                } else if names.is(name, b"t") {
                    in_t = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}
