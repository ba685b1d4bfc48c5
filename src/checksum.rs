//! # Sentence Checksums
//!
//! The NMEA 0183 checksum is the XOR of every byte between the leading `$` and the
//! `*` delimiter, written as two hexadecimal digits after the `*`.

use nom::{Parser, error::ErrorKind, number::complete::hex_u32};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{IResult, parsing::consumed};

/// Defines what the engine does with the checksum token of a framed sentence.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumMode {
    #[default]
    /// The token must be hexadecimal and equal to the computed checksum.
    ///
    /// A sentence that fails is rejected and its record is left untouched.
    Verify,

    /// The token is copied into the record without being checked.
    Ignore,
}

/// Calculates the NMEA 0183 checksum of `data`.
///
/// `data` is the sentence body without the leading `$` and without the `*CC` trailer.
///
/// # Examples
///
/// ```rust
/// use nmea0183_capture::checksum;
///
/// let cc = checksum(b"GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,");
/// assert_eq!(cc, 0x47);
/// ```
pub fn checksum(data: &[u8]) -> u8 {
    data.iter()
        .fold(0u8, |accumulated_xor, &byte| accumulated_xor ^ byte)
}

/// Reads a two-character checksum token as a byte, if it is hexadecimal.
///
/// ```rust
/// use nmea0183_capture::parse_checksum_token;
///
/// assert_eq!(parse_checksum_token(b"4B"), Some(0x4B));
/// assert_eq!(parse_checksum_token(b"4b"), Some(0x4B));
/// assert_eq!(parse_checksum_token(b"ZZ"), None);
/// ```
pub fn parse_checksum_token(token: &[u8]) -> Option<u8> {
    if token.len() != 2 {
        return None;
    }

    let result: IResult<&[u8], u32> = consumed(hex_u32, ErrorKind::HexDigit).parse(token);
    result.ok().and_then(|(_, cc)| u8::try_from(cc).ok())
}

/// Formats a checksum value as a two-digit uppercase hexadecimal string.
///
/// ```rust
/// use nmea0183_capture::format_checksum;
///
/// assert_eq!(format_checksum(0x0A).as_str(), "0A");
/// ```
pub fn format_checksum(checksum: u8) -> heapless::String<2> {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = heapless::String::new();
    for nibble in [checksum >> 4, checksum & 0x0F] {
        // Two ASCII digits always fit.
        let _ = out.push(char::from(DIGITS[usize::from(nibble)]));
    }
    out
}
