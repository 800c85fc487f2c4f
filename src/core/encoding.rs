//! Source Encoding Detection and Decoding
//!
//! Scribus writes UTF-8, but files that went through other editors may carry
//! a BOM or arrive as UTF-16. Everything is decoded to a `String` before
//! lexing since chunk offsets are byte offsets into that string.

use crate::error::{Error, Result};

/// Encoding of raw SLA input, detected from the BOM or the first bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl SourceEncoding {
    /// Detect encoding from byte order mark or initial bytes
    pub fn detect(input: &[u8]) -> Self {
        if input.len() < 2 {
            return SourceEncoding::Utf8;
        }

        match (input[0], input[1]) {
            (0xFF, 0xFE) => SourceEncoding::Utf16Le,
            (0xFE, 0xFF) => SourceEncoding::Utf16Be,
            // No BOM: '<' next to a NUL byte means UTF-16
            (0x00, b'<') => SourceEncoding::Utf16Be,
            (b'<', 0x00) => SourceEncoding::Utf16Le,
            _ => SourceEncoding::Utf8,
        }
    }
}

/// Decode raw bytes into markup text.
///
/// A UTF-8 BOM is dropped. UTF-16 input (with or without BOM) is converted.
/// Invalid sequences are an [`Error::Encoding`].
pub fn decode_source(input: &[u8]) -> Result<String> {
    match SourceEncoding::detect(input) {
        SourceEncoding::Utf8 => {
            let body = input.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(input);
            std::str::from_utf8(body)
                .map(str::to_owned)
                .map_err(|e| Error::Encoding(format!("Invalid UTF-8: {}", e)))
        }
        SourceEncoding::Utf16Le => decode_utf16(input, [0xFF, 0xFE], u16::from_le_bytes, "LE"),
        SourceEncoding::Utf16Be => decode_utf16(input, [0xFE, 0xFF], u16::from_be_bytes, "BE"),
    }
}

fn decode_utf16(
    input: &[u8],
    bom: [u8; 2],
    to_unit: fn([u8; 2]) -> u16,
    label: &str,
) -> Result<String> {
    let bytes = input.strip_prefix(&bom).unwrap_or(input);

    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding(format!(
            "Invalid UTF-16 {}: odd number of bytes",
            label
        )));
    }

    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect();

    String::from_utf16(&code_units)
        .map_err(|e| Error::Encoding(format!("Invalid UTF-16 {}: {}", label, e)))
}
