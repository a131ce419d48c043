//! # Radio Error Handling
//!
//! This module defines the RadioError enum for the fallible surfaces of the
//! crate: configuration, scenario scripts and the simulation harness.
//!
//! The protocol engine itself never fails. Anomalies on the air and
//! inconsistent firmware requests are reported through `log` and the radio
//! keeps running.

use thiserror::Error;

/// Represents the different error types that can occur in the radio crate.
#[derive(Debug, Error)]
pub enum RadioError {
    /// Indicates a configuration value that cannot drive the simulation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Indicates an address outside the transceiver register window.
    #[error("Register address out of range: 0x{0:03X}")]
    RegisterOutOfRange(u16),

    /// Indicates a node index that does not exist in the network.
    #[error("Unknown node: {0}")]
    UnknownNode(usize),

    /// Indicates a malformed scenario script.
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// Indicates a PSDU that does not fit the 127 byte PHY payload.
    #[error("Frame too long: {0} bytes")]
    FrameTooLong(usize),

    /// Indicates a frame buffer image that cannot be parsed.
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    /// Indicates a network that did not settle within the allowed time.
    #[error("Network still busy after {0} byte-times")]
    Busy(u64),

    /// Indicates an invalid hexadecimal frame image.
    #[error("Invalid hex frame: {0}")]
    Hex(String),

    /// Wraps file access failures.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Wraps JSON decoding failures.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::util::hex::HexError> for RadioError {
    fn from(err: crate::util::hex::HexError) -> Self {
        RadioError::Hex(err.to_string())
    }
}
