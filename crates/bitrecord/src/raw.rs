//! The raw hex view of a record.
//!
//! Canonical form is lower-case hex with bytes grouped in pairs, e.g.
//! `0000 0000 0000 0000 0000 0000` for a 12-byte record. Whitespace is cosmetic on
//! input.

use crate::{bits::BitBuffer, errors::RawTextError};

/// Formats `buffer` in canonical grouped form.
pub fn format(buffer: &BitBuffer) -> String {
    buffer
        .as_bytes()
        .chunks(2)
        .map(hex::encode)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes all whitespace from `text`.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Parses raw text into a buffer of exactly `len` bytes.
pub fn parse(text: &str, len: usize) -> Result<BitBuffer, RawTextError> {
    let digits = normalize(text);
    let expected = len * 2;
    if digits.len() != expected {
        return Err(RawTextError::WrongLength {
            expected,
            found: digits.len(),
        });
    }

    let bytes = hex::decode(&digits).map_err(|_| RawTextError::InvalidHex)?;

    Ok(BitBuffer::new(bytes))
}
