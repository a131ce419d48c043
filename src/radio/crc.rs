//! # Frame Check Sequence Engine
//!
//! 16-bit CRC-CCITT (polynomial 0x1021, initial value 0) as computed by the
//! transceiver. Octets travel least-significant bit first, so every octet is
//! bit-reversed before it enters the register, and the two result octets are
//! reversed again before they are placed on the air (high octet first).
//!
//! The value on the air equals the IEEE 802.15.4 FCS (CRC-16/KERMIT over the
//! natural octets, transmitted low octet first).

use crate::util::bitrev::rev8;

/// CRC-CCITT generator polynomial
pub const CRC16_POLY: u16 = 0x1021;

/// Feed one octet (already in CRC bit order) into `crc`.
#[inline]
pub fn crc_accumulate(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ ((byte as u16) << 8);
    for _ in 0..8 {
        crc = if crc & 0x8000 != 0 {
            (crc << 1) ^ CRC16_POLY
        } else {
            crc << 1
        };
    }
    crc
}

/// Running CRC over octets in wire order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc16 {
    value: u16,
}

impl Crc16 {
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Accumulate a frame octet as stored in the frame buffer.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.value = crc_accumulate(self.value, rev8(byte));
    }

    /// Current register value
    pub fn value(&self) -> u16 {
        self.value
    }

    /// The two octets to transmit, in transmission order
    pub fn wire_bytes(&self) -> [u8; 2] {
        [rev8((self.value >> 8) as u8), rev8(self.value as u8)]
    }

    /// Reassemble a register value from two received CRC octets
    pub fn from_wire(first: u8, second: u8) -> u16 {
        ((rev8(first) as u16) << 8) | rev8(second) as u16
    }

    /// CRC of a complete frame body (FCF through payload)
    pub fn compute(data: &[u8]) -> u16 {
        let mut crc = Self::new();
        for &byte in data {
            crc.push(byte);
        }
        crc.value()
    }
}
