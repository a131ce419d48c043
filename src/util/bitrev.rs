//! # Octet Bit Order
//!
//! The 802.15.4 PHY transmits every octet least-significant bit first, while
//! the frame check sequence is defined over the natural bit order. The radio
//! therefore bit-reverses each octet before feeding the CRC register and
//! reverses the CRC octets again before they go on the air.
//!
//! ```rust
//! use rfa1_radio::util::bitrev::{rev8, REVERSE_BITS};
//!
//! assert_eq!(rev8(0x01), 0x80);
//! assert_eq!(REVERSE_BITS[0x7A], 0x5E);
//! ```

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut octet = 0usize;
    while octet < table.len() {
        table[octet] = (octet as u8).reverse_bits();
        octet += 1;
    }
    table
}

/// Transmission bit-reversal table, indexed by the natural octet.
pub static REVERSE_BITS: [u8; 256] = build_table();

/// Mirror an octet between wire order and CRC order.
#[inline]
pub fn rev8(octet: u8) -> u8 {
    REVERSE_BITS[usize::from(octet)]
}

/// Mirror a CRC register value; the reversed low octet becomes the high one.
#[inline]
pub fn rev16(value: u16) -> u16 {
    let [hi, lo] = value.to_be_bytes();
    u16::from_be_bytes([rev8(lo), rev8(hi)])
}

/// Wire-order copy of a PSDU, as the CRC engine consumes it
pub fn rev8_vec(octets: &[u8]) -> Vec<u8> {
    octets.iter().copied().map(rev8).collect()
}
