//! # Frame Images in Hex
//!
//! Scenario scripts and the CLI describe frame buffer contents as hex text.
//! Octets may be written back to back (`4188`), separated by whitespace or
//! commas, and individually prefixed with `0x`, so a dump pasted from a
//! sniffer or a C array both load.
//!
//! ```rust
//! use rfa1_radio::util::hex::{decode_hex, format_hex_compact};
//!
//! let frame = decode_hex("0x61, 0x88, 2a cdab").unwrap();
//! assert_eq!(frame, vec![0x61, 0x88, 0x2A, 0xCD, 0xAB]);
//! assert_eq!(format_hex_compact(&frame[..2]), "61 88");
//! ```

use thiserror::Error;

/// Why a hex frame image was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("frame image contains no octets")]
    Empty,

    #[error("frame image has {0} hex digits, expected whole octets")]
    OddDigits(usize),

    #[error("invalid hex digit {found:?} at digit {position}")]
    BadDigit { position: usize, found: char },
}

/// Lowercase hex without separators, as printed for FCS values.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Parse a frame image into octets.
pub fn decode_hex(image: &str) -> Result<Vec<u8>, HexError> {
    let digits: String = image
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();

    if digits.is_empty() {
        return Err(HexError::Empty);
    }
    if digits.len() % 2 != 0 {
        return Err(HexError::OddDigits(digits.len()));
    }

    hex::decode(&digits).map_err(|err| match err {
        hex::FromHexError::InvalidHexCharacter { c, index } => HexError::BadDigit {
            position: index,
            found: c,
        },
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            HexError::OddDigits(digits.len())
        }
    })
}

/// Space separated octets for log lines and reports: `41 88 01`.
pub fn format_hex_compact(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, octet) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&hex::encode([*octet]));
    }
    out
}

/// Offset-prefixed dump of a frame buffer, `width` octets per row.
pub fn pretty_hex(data: &[u8], width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    data.chunks(width)
        .enumerate()
        .map(|(row, chunk)| format!("{:04x}: {}", row * width, format_hex_compact(chunk)))
        .collect::<Vec<_>>()
        .join("\n")
}
