//! Fallback output encoding.

use crate::error::{Error, Result};
use encoding_rs::Encoding;

/// Resolve an encoding label such as `"latin1"` or `"shift_jis"`.
pub fn lookup_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::Encoding(format!("unknown encoding label {label:?}")))
}

/// Encode `text` into `encoding`.
///
/// Characters the encoding cannot represent become numeric character
/// references (`&#12345;`).
pub fn encode_text(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding.encode(text);
    bytes.into_owned()
}
