//! # Utility Modules
//!
//! Common helpers used throughout the crate: bit reversal for the wire bit
//! order, hex encoding/decoding, and frame logging.

pub mod bitrev;
pub mod hex;
pub mod logging;

// Re-export commonly used types and functions
pub use bitrev::{rev16, rev8, rev8_vec, REVERSE_BITS};
pub use hex::{decode_hex, encode_hex, format_hex_compact, pretty_hex, HexError};
pub use logging::{log_frame_hex, log_frame_structured};
