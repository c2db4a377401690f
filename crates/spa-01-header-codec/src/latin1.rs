//! ISO-8859-1 conversions.
//!
//! The legacy network carries text in a single-byte Western code page; every
//! byte maps to the Unicode scalar with the same value.

/// Encodes `text` byte-per-char, failing on the first unmappable char.
pub fn encode(text: &str) -> Result<Vec<u8>, char> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| c))
        .collect()
}

/// Encodes `text`, replacing unmappable chars with `?`.
pub fn encode_lossy(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// Decodes single-byte text. Never fails.
pub fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
