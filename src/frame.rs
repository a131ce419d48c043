//! # IEEE 802.15.4 Frames
//!
//! Firmware-side helpers around the radio's frame buffer. The radio itself
//! only looks at a handful of header bits; this module builds and parses
//! complete MAC headers so tests, scenario scripts and the CLI can talk in
//! frames instead of byte arrays.
//!
//! ```text
//! | FCF (2) | DSN (1) | dst PAN (0/2) | dst addr (0/2/8) | src PAN (0/2) | src addr (0/2/8) | payload | FCS (2) |
//! ```
//!
//! Multi-byte fields are little endian on the air.

use crate::constants::PHY_LENGTH_MASK;
use crate::error::RadioError;
use crate::radio::crc::Crc16;
use crate::radio::filter::AddressingMode;

/// Largest PSDU including the FCS
pub const MAX_PSDU_LEN: usize = PHY_LENGTH_MASK as usize;

/// Frame type, FCF bits 0..2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Beacon,
    Data,
    Ack,
    MacCommand,
    Reserved(u8),
}

impl FrameType {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => FrameType::Beacon,
            1 => FrameType::Data,
            2 => FrameType::Ack,
            3 => FrameType::MacCommand,
            other => FrameType::Reserved(other),
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            FrameType::Beacon => 0,
            FrameType::Data => 1,
            FrameType::Ack => 2,
            FrameType::MacCommand => 3,
            FrameType::Reserved(bits) => bits & 0x07,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FrameType::Beacon => "beacon",
            FrameType::Data => "data",
            FrameType::Ack => "ack",
            FrameType::MacCommand => "command",
            FrameType::Reserved(_) => "reserved",
        }
    }
}

fn mode_bits(mode: AddressingMode) -> u8 {
    match mode {
        AddressingMode::None => 0,
        AddressingMode::Reserved => 1,
        AddressingMode::Short => 2,
        AddressingMode::Long => 3,
    }
}

/// Decoded frame control field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameControl {
    pub frame_type: FrameType,
    pub security: bool,
    pub frame_pending: bool,
    pub ack_request: bool,
    pub pan_id_compression: bool,
    pub dst_mode: AddressingMode,
    pub frame_version: u8,
    pub src_mode: AddressingMode,
}

impl FrameControl {
    /// Decode the two FCF octets as they appear on the air
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        let [low, high] = bytes;
        Self {
            frame_type: FrameType::from_bits(low),
            security: low & 0x08 != 0,
            frame_pending: low & 0x10 != 0,
            ack_request: low & 0x20 != 0,
            pan_id_compression: low & 0x40 != 0,
            dst_mode: AddressingMode::destination(high),
            frame_version: (high >> 4) & 0x03,
            src_mode: AddressingMode::destination(high >> 4),
        }
    }

    pub fn to_bytes(&self) -> [u8; 2] {
        let mut low = self.frame_type.bits();
        if self.security {
            low |= 0x08;
        }
        if self.frame_pending {
            low |= 0x10;
        }
        if self.ack_request {
            low |= 0x20;
        }
        if self.pan_id_compression {
            low |= 0x40;
        }
        let high = (mode_bits(self.dst_mode) << 2)
            | ((self.frame_version & 0x03) << 4)
            | (mode_bits(self.src_mode) << 6);
        [low, high]
    }
}

/// A MAC address field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Address {
    #[default]
    None,
    Short(u16),
    Long(u64),
}

impl Address {
    pub fn mode(&self) -> AddressingMode {
        match self {
            Address::None => AddressingMode::None,
            Address::Short(_) => AddressingMode::Short,
            Address::Long(_) => AddressingMode::Long,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            Address::None => {}
            Address::Short(addr) => out.extend_from_slice(&addr.to_le_bytes()),
            Address::Long(addr) => out.extend_from_slice(&addr.to_le_bytes()),
        }
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Address::None => write!(f, "-"),
            Address::Short(addr) => write!(f, "0x{addr:04X}"),
            Address::Long(addr) => write!(f, "{addr:016X}"),
        }
    }
}

/// Builder for outgoing frames
///
/// # Examples
/// ```rust
/// use rfa1_radio::frame::{Address, FrameBuilder};
///
/// let psdu = FrameBuilder::data(0x2A)
///     .ack_request(true)
///     .destination(0xABCD, Address::Short(0x0002))
///     .source(0xABCD, Address::Short(0x0001))
///     .payload(&[0xDE, 0xAD])
///     .build()
///     .unwrap();
/// assert_eq!(&psdu[..3], &[0x61, 0x88, 0x2A]);
/// ```
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    frame_type: FrameType,
    dsn: u8,
    ack_request: bool,
    frame_pending: bool,
    dst_pan: Option<u16>,
    dst: Address,
    src_pan: Option<u16>,
    src: Address,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub fn new(frame_type: FrameType, dsn: u8) -> Self {
        Self {
            frame_type,
            dsn,
            ack_request: false,
            frame_pending: false,
            dst_pan: None,
            dst: Address::None,
            src_pan: None,
            src: Address::None,
            payload: Vec::new(),
        }
    }

    pub fn data(dsn: u8) -> Self {
        Self::new(FrameType::Data, dsn)
    }

    /// Immediate acknowledgment for `dsn`
    pub fn ack(dsn: u8) -> Self {
        Self::new(FrameType::Ack, dsn)
    }

    pub fn ack_request(mut self, on: bool) -> Self {
        self.ack_request = on;
        self
    }

    pub fn frame_pending(mut self, on: bool) -> Self {
        self.frame_pending = on;
        self
    }

    pub fn destination(mut self, pan_id: u16, addr: Address) -> Self {
        self.dst_pan = Some(pan_id);
        self.dst = addr;
        self
    }

    pub fn source(mut self, pan_id: u16, addr: Address) -> Self {
        self.src_pan = Some(pan_id);
        self.src = addr;
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.to_vec();
        self
    }

    pub fn frame_control(&self) -> FrameControl {
        let dst_mode = self.dst.mode();
        let src_mode = self.src.mode();
        let compress = dst_mode != AddressingMode::None
            && src_mode != AddressingMode::None
            && self.dst_pan == self.src_pan;
        FrameControl {
            frame_type: self.frame_type,
            security: false,
            frame_pending: self.frame_pending,
            ack_request: self.ack_request,
            pan_id_compression: compress,
            dst_mode,
            frame_version: 0,
            src_mode,
        }
    }

    /// MAC header and payload, without the FCS
    pub fn build(&self) -> Result<Vec<u8>, RadioError> {
        let fc = self.frame_control();
        let mut psdu = Vec::with_capacity(MAX_PSDU_LEN);
        psdu.extend_from_slice(&fc.to_bytes());
        psdu.push(self.dsn);

        if fc.dst_mode != AddressingMode::None {
            psdu.extend_from_slice(&self.dst_pan.unwrap_or(0xFFFF).to_le_bytes());
            self.dst.write(&mut psdu);
        }
        if fc.src_mode != AddressingMode::None {
            if !fc.pan_id_compression {
                psdu.extend_from_slice(&self.src_pan.unwrap_or(0xFFFF).to_le_bytes());
            }
            self.src.write(&mut psdu);
        }
        psdu.extend_from_slice(&self.payload);

        if psdu.len() + 2 > MAX_PSDU_LEN {
            return Err(RadioError::FrameTooLong(psdu.len() + 2));
        }
        Ok(psdu)
    }

    /// Frame buffer image as firmware writes it: PHY length, PSDU, and two
    /// placeholder FCS octets that the radio replaces on the air
    pub fn buffer_image(&self) -> Result<Vec<u8>, RadioError> {
        let psdu = self.build()?;
        let mut image = Vec::with_capacity(psdu.len() + 3);
        image.push((psdu.len() + 2) as u8);
        image.extend_from_slice(&psdu);
        image.extend_from_slice(&[0, 0]);
        Ok(image)
    }
}

/// A frame read back from the receive frame buffer
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedFrame {
    pub control: FrameControl,
    pub dsn: u8,
    pub dst_pan: Option<u16>,
    pub dst: Address,
    pub src_pan: Option<u16>,
    pub src: Address,
    pub payload: Vec<u8>,
    /// FCS octets as received
    pub fcs: [u8; 2],
    pub lqi: u8,
    /// FCS recomputed over the PSDU matches
    pub crc_valid: bool,
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], RadioError> {
        let end = self.pos + n;
        let slice = self.data.get(self.pos..end).ok_or_else(|| {
            RadioError::MalformedFrame(format!("header truncated at byte {}", self.pos))
        })?;
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16, RadioError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn address(&mut self, mode: AddressingMode) -> Result<Address, RadioError> {
        match mode {
            AddressingMode::None => Ok(Address::None),
            AddressingMode::Short => Ok(Address::Short(self.u16()?)),
            AddressingMode::Long => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(self.take(8)?);
                Ok(Address::Long(u64::from_le_bytes(bytes)))
            }
            AddressingMode::Reserved => Err(RadioError::MalformedFrame(
                "reserved addressing mode".to_string(),
            )),
        }
    }
}

impl ReceivedFrame {
    /// Parse a receive frame buffer
    ///
    /// `buffer` starts at `TRXFBST`: the PSDU of `length` octets (FCS
    /// included), then the link quality byte.
    pub fn from_buffer(length: u8, buffer: &[u8]) -> Result<Self, RadioError> {
        let length = (length & PHY_LENGTH_MASK) as usize;
        if length < 5 {
            return Err(RadioError::MalformedFrame(format!(
                "length {length} too short for a MAC frame"
            )));
        }
        if buffer.len() < length + 1 {
            return Err(RadioError::MalformedFrame(format!(
                "buffer of {} bytes cannot hold length {length}",
                buffer.len()
            )));
        }

        let psdu = &buffer[..length - 2];
        let fcs = [buffer[length - 2], buffer[length - 1]];
        let lqi = buffer[length];
        let crc_valid = Crc16::compute(psdu) == Crc16::from_wire(fcs[0], fcs[1]);

        let mut cursor = Cursor { data: psdu, pos: 0 };
        let fcf = cursor.take(2)?;
        let control = FrameControl::from_bytes([fcf[0], fcf[1]]);
        let dsn = cursor.take(1)?[0];

        let mut dst_pan = None;
        if control.dst_mode != AddressingMode::None {
            dst_pan = Some(cursor.u16()?);
        }
        let dst = cursor.address(control.dst_mode)?;

        let mut src_pan = None;
        if control.src_mode != AddressingMode::None {
            src_pan = if control.pan_id_compression {
                dst_pan
            } else {
                Some(cursor.u16()?)
            };
        }
        let src = cursor.address(control.src_mode)?;

        Ok(Self {
            control,
            dsn,
            dst_pan,
            dst,
            src_pan,
            src,
            payload: psdu[cursor.pos..].to_vec(),
            fcs,
            lqi,
            crc_valid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FrameBuilder {
        FrameBuilder::data(0x2A)
            .ack_request(true)
            .destination(0xABCD, Address::Short(0x0002))
            .source(0xABCD, Address::Short(0x0001))
            .payload(&[0xDE, 0xAD])
    }

    /// PSDU + FCS + LQI, as the receiver leaves it
    fn rx_buffer(psdu: &[u8], lqi: u8) -> Vec<u8> {
        let mut crc = Crc16::new();
        psdu.iter().for_each(|&b| crc.push(b));
        let mut buffer = psdu.to_vec();
        buffer.extend_from_slice(&crc.wire_bytes());
        buffer.push(lqi);
        buffer
    }

    #[test]
    fn test_build_short_addressed_data_frame() {
        let psdu = sample().build().unwrap();
        assert_eq!(
            psdu,
            vec![0x61, 0x88, 0x2A, 0xCD, 0xAB, 0x02, 0x00, 0x01, 0x00, 0xDE, 0xAD]
        );
    }

    #[test]
    fn test_buffer_image_has_length_and_placeholders() {
        let image = sample().buffer_image().unwrap();
        assert_eq!(image[0], 13);
        assert_eq!(image.len(), 14);
        assert_eq!(&image[12..], &[0, 0]);
    }

    #[test]
    fn test_no_compression_across_pans() {
        let psdu = FrameBuilder::data(1)
            .destination(0x1111, Address::Short(0x0002))
            .source(0x2222, Address::Long(0x0102030405060708))
            .build()
            .unwrap();
        let fc = FrameControl::from_bytes([psdu[0], psdu[1]]);
        assert!(!fc.pan_id_compression);
        assert_eq!(fc.src_mode, AddressingMode::Long);
        assert_eq!(psdu.len(), 3 + 4 + 2 + 8);
    }

    #[test]
    fn test_ack_frame() {
        let psdu = FrameBuilder::ack(0x2A).build().unwrap();
        assert_eq!(psdu, vec![0x02, 0x00, 0x2A]);
    }

    #[test]
    fn test_too_long() {
        let err = FrameBuilder::data(0).payload(&[0u8; 123]).build().unwrap_err();
        assert!(matches!(err, RadioError::FrameTooLong(128)));
        assert!(FrameBuilder::data(0).payload(&[0u8; 122]).build().is_ok());
    }

    #[test]
    fn test_frame_control_bits() {
        let fc = FrameControl::from_bytes([0x61, 0x88]);
        assert_eq!(fc.frame_type, FrameType::Data);
        assert!(fc.ack_request);
        assert!(fc.pan_id_compression);
        assert!(!fc.security);
        assert_eq!(fc.dst_mode, AddressingMode::Short);
        assert_eq!(fc.src_mode, AddressingMode::Short);
        assert_eq!(fc.to_bytes(), [0x61, 0x88]);
        assert_eq!(FrameType::from_bits(0x05), FrameType::Reserved(5));
    }

    #[test]
    fn test_parse_received_frame() {
        let psdu = sample().build().unwrap();
        let buffer = rx_buffer(&psdu, 0xE5);
        let frame = ReceivedFrame::from_buffer(psdu.len() as u8 + 2, &buffer).unwrap();

        assert!(frame.crc_valid);
        assert_eq!(frame.dsn, 0x2A);
        assert_eq!(frame.dst_pan, Some(0xABCD));
        assert_eq!(frame.dst, Address::Short(2));
        assert_eq!(frame.src_pan, Some(0xABCD));
        assert_eq!(frame.src, Address::Short(1));
        assert_eq!(frame.payload, vec![0xDE, 0xAD]);
        assert_eq!(frame.lqi, 0xE5);
    }

    #[test]
    fn test_parse_detects_bad_fcs() {
        let psdu = sample().build().unwrap();
        let mut buffer = rx_buffer(&psdu, 0x40);
        buffer[9] ^= 0xFF;
        let frame = ReceivedFrame::from_buffer(psdu.len() as u8 + 2, &buffer).unwrap();
        assert!(!frame.crc_valid);
    }

    #[test]
    fn test_parse_ack() {
        let buffer = rx_buffer(&[0x02, 0x00, 0x07], 0x80);
        let frame = ReceivedFrame::from_buffer(5, &buffer).unwrap();
        assert_eq!(frame.control.frame_type, FrameType::Ack);
        assert_eq!(frame.dst, Address::None);
        assert!(frame.payload.is_empty());
        assert!(frame.crc_valid);
    }

    #[test]
    fn test_parse_rejects_truncated() {
        assert!(ReceivedFrame::from_buffer(3, &[0; 10]).is_err());
        assert!(ReceivedFrame::from_buffer(20, &[0; 10]).is_err());
        // Long destination claimed but only 2 header bytes follow the DSN
        let buffer = rx_buffer(&[0x41, 0x0C, 0x01, 0xCD, 0xAB], 0);
        assert!(matches!(
            ReceivedFrame::from_buffer(7, &buffer),
            Err(RadioError::MalformedFrame(_))
        ));
    }
}
