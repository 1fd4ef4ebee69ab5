//! Element name matching for SpreadsheetML parts.
//!
//! Parts usually put SpreadsheetML in the default namespace (`<sst xmlns="...">`),
//! so element names carry no prefix. Some producers bind it to a prefix instead
//! (`<x:sst xmlns:x="...">`). Parsers first match bare names and, when that finds
//! nothing, retry with the prefix declared on the root element.

use crate::error::Result;
use log::warn;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

/// How element names are compared against the expected local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NameMatch {
    /// Names without a namespace prefix (`si`).
    Unqualified,
    /// Names qualified with the given prefix (`x:si`).
    Prefixed(Vec<u8>),
}

impl NameMatch {
    /// Whether `name` is the element `local` under this strategy.
    pub(crate) fn is(&self, name: QName<'_>, local: &[u8]) -> bool {
        match self {
            NameMatch::Unqualified => name.as_ref() == local,
            NameMatch::Prefixed(prefix) => {
                name.prefix().is_some_and(|p| p.as_ref() == prefix.as_slice())
                    && name.local_name().as_ref() == local
            }
        }
    }
}

/// A reader configured for part parsing.
///
/// Text is not trimmed (`xml:space="preserve"` runs keep their spaces) and
/// empty elements are expanded into start/end pairs.
pub(crate) fn reader(xml: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(xml);
    let config = reader.config_mut();
    config.trim_text(false);
    config.expand_empty_elements = true;
    reader
}

/// Namespace prefix of the document's root element, if it has one.
pub(crate) fn root_prefix(xml: &str) -> Result<Option<Vec<u8>>> {
    let mut reader = reader(xml);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                return Ok(e.name().prefix().map(|p| p.as_ref().to_vec()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

/// Run `parse` with bare names, then with the root prefix if nothing matched.
///
/// `parse` returns its result together with the number of target elements it
/// matched; zero triggers the qualified retry.
pub(crate) fn parse_with_fallback<T>(
    xml: &str,
    part: &str,
    parse: impl Fn(&NameMatch) -> Result<(T, usize)>,
) -> Result<T> {
    let (unqualified, matched) = parse(&NameMatch::Unqualified)?;
    if matched > 0 {
        return Ok(unqualified);
    }

    match root_prefix(xml)? {
        Some(prefix) => {
            warn!(
                "{part}: no unqualified elements, retrying with prefix {:?}",
                String::from_utf8_lossy(&prefix)
            );
            let (qualified, _) = parse(&NameMatch::Prefixed(prefix))?;
            Ok(qualified)
        }
        None => Ok(unqualified),
    }
}
