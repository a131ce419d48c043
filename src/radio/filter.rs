//! # Address and Frame Filter
//!
//! Early frame rejection while a frame is still arriving. After each of the
//! first 13 PSDU bytes the receiver asks whether the frame can still be for
//! this node. Only the positions where a header field completes do any work:
//!
//! | Position | Field completed              | Check                                   |
//! |----------|------------------------------|-----------------------------------------|
//! | 1        | FCF low byte (frame type)    | reserved frame types are rejected       |
//! | 3        | sequence number              | none (DSN is captured by the receiver)  |
//! | 5        | destination PAN id           | local PAN id or 0xFFFF                  |
//! | 7        | destination short address    | local short address or 0xFFFF           |
//! | 13       | destination long address     | local IEEE address or all ones          |
//!
//! Frames of a reserved type pass every position after the first.

use super::hal::RegisterFile;
use crate::constants::{
    IEEE_ADDR_0, LONG_BROADCAST_ADDR, PAN_ID_0, SHORT_ADDR_0, SHORT_BROADCAST_ADDR,
};

/// FCF low byte: frame type field
const FRAME_TYPE_MASK: u8 = 0x07;
/// FCF low byte: set for the reserved frame types 4..=7
const FRAME_TYPE_RESERVED: u8 = 0x04;
/// Beacon frame type
const FRAME_TYPE_BEACON: u8 = 0x00;

/// Destination addressing mode, FCF bits 10..11
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    None,
    Reserved,
    Short,
    Long,
}

impl AddressingMode {
    /// Destination mode from the FCF high byte
    pub fn destination(fcf_high: u8) -> Self {
        match (fcf_high >> 2) & 0x03 {
            0 => AddressingMode::None,
            1 => AddressingMode::Reserved,
            2 => AddressingMode::Short,
            _ => AddressingMode::Long,
        }
    }

    /// Whether a destination PAN id precedes the address
    pub fn has_pan_id(self) -> bool {
        matches!(self, AddressingMode::Short | AddressingMode::Long)
    }
}

/// The node's programmed identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalIdentity {
    pub pan_id: [u8; 2],
    pub short_addr: [u8; 2],
    pub ieee_addr: [u8; 8],
}

impl LocalIdentity {
    /// Read the identity registers
    pub fn read<R: RegisterFile + ?Sized>(regs: &R) -> Self {
        let mut ieee_addr = [0u8; 8];
        for (i, byte) in ieee_addr.iter_mut().enumerate() {
            *byte = regs.read_data_byte(IEEE_ADDR_0 + i as u16);
        }
        Self {
            pan_id: [regs.read_data_byte(PAN_ID_0), regs.read_data_byte(PAN_ID_0 + 1)],
            short_addr: [
                regs.read_data_byte(SHORT_ADDR_0),
                regs.read_data_byte(SHORT_ADDR_0 + 1),
            ],
            ieee_addr,
        }
    }
}

fn is_reserved(header: &[u8]) -> bool {
    header[0] & FRAME_TYPE_RESERVED != 0
}

/// Decide whether a frame may still be addressed to `identity`
///
/// `header` holds the PSDU bytes received so far and must contain at least
/// `position` bytes. Positions outside 1..=13 accept.
pub fn match_address(position: usize, header: &[u8], identity: &LocalIdentity) -> bool {
    if position == 0 || header.len() < position {
        return true;
    }

    if position > 1 && is_reserved(header) {
        return true;
    }

    match position {
        1 => !is_reserved(header),
        5 => {
            let mode = AddressingMode::destination(header[1]);
            !mode.has_pan_id() || matches_or_broadcast(&header[3..5], &identity.pan_id, &SHORT_BROADCAST_ADDR)
        }
        7 => {
            AddressingMode::destination(header[1]) != AddressingMode::Short
                || matches_or_broadcast(&header[5..7], &identity.short_addr, &SHORT_BROADCAST_ADDR)
        }
        13 => {
            AddressingMode::destination(header[1]) != AddressingMode::Long
                || matches_or_broadcast(&header[5..13], &identity.ieee_addr, &LONG_BROADCAST_ADDR)
        }
        _ => true,
    }
}

/// Sequence number to acknowledge, captured once three bytes are in
///
/// Beacons and reserved frame types are never acknowledged.
pub fn sequence_number(position: usize, header: &[u8]) -> Option<u8> {
    if position != 3 || header.len() < 3 {
        return None;
    }
    let frame_type = header[0] & FRAME_TYPE_MASK;
    if frame_type != FRAME_TYPE_BEACON && !is_reserved(header) {
        Some(header[2])
    } else {
        None
    }
}

fn matches_or_broadcast(field: &[u8], local: &[u8], broadcast: &[u8]) -> bool {
    field == local || field == broadcast
}
