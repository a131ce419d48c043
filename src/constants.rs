//! ATmega128RFA1 Transceiver Constants
//!
//! This module defines the register addresses, state and command encodings and
//! protocol timing used by the radio model, as laid out in the ATmega128RFA1
//! datasheet (transceiver registers are memory mapped from 0x141).

// ----------------------------------------------------------------------------
// Register addresses
// ----------------------------------------------------------------------------

/// Transceiver pin register (SLPTR, TRXRST)
pub const TRXPR: u16 = 0x139;

/// Transceiver status (CCA_DONE, CCA_STATUS, TRX_STATUS[4:0])
pub const TRX_STATUS: u16 = 0x141;

/// Transceiver state control (TRAC_STATUS[2:0], TRX_CMD[4:0])
pub const TRX_STATE: u16 = 0x142;

pub const TRX_CTRL_0: u16 = 0x143;
pub const TRX_CTRL_1: u16 = 0x144;

/// Transmit power control
pub const PHY_TX_PWR: u16 = 0x145;

/// Received signal strength (RX_CRC_VALID, RND_VALUE, RSSI[4:0])
pub const PHY_RSSI: u16 = 0x146;

/// Energy detection level; a write starts an ED measurement
pub const PHY_ED_LEVEL: u16 = 0x147;

/// Channel and CCA mode (CCA_REQUEST, CCA_MODE[1:0], CHANNEL[4:0])
pub const PHY_CC_CCA: u16 = 0x148;

/// CCA energy threshold
pub const CCA_THRES: u16 = 0x149;

pub const IRQ_MASK: u16 = 0x14E;
pub const IRQ_STATUS: u16 = 0x14F;

pub const SHORT_ADDR_0: u16 = 0x160;
pub const SHORT_ADDR_1: u16 = 0x161;
pub const PAN_ID_0: u16 = 0x162;
pub const PAN_ID_1: u16 = 0x163;

/// First byte of the 64-bit IEEE address (IEEE_ADDR_0..IEEE_ADDR_7)
pub const IEEE_ADDR_0: u16 = 0x164;

/// Extended operating mode retries (MAX_FRAME_RETRIES[3:0], MAX_CSMA_RETRIES[2:0], SLOTTED)
pub const XAH_CTRL_0: u16 = 0x16C;

/// CSMA seed high bits and auto-ACK control (AACK_DIS_ACK is bit 4)
pub const CSMA_SEED_1: u16 = 0x16E;

/// Length of the last received frame
pub const TST_RX_LENGTH: u16 = 0x17B;

/// Frame buffer start (TRXFBST); the buffer spans 128 bytes
pub const TRXFBST: u16 = 0x180;

/// Frame buffer size in bytes
pub const FRAME_BUFFER_LEN: u16 = 128;

/// Last address of the transceiver register window
pub const REGISTER_SPACE_END: u16 = TRXFBST + FRAME_BUFFER_LEN;

// ----------------------------------------------------------------------------
// Register bit fields
// ----------------------------------------------------------------------------

pub const TRXPR_TRXRST: u8 = 0x01;
pub const TRXPR_SLPTR: u8 = 0x02;

pub const TRX_STATUS_CCA_DONE: u8 = 0x80;
pub const TRX_STATUS_CCA_STATUS: u8 = 0x40;
pub const TRX_STATUS_STATE_MASK: u8 = 0x1F;
/// Bits of TRX_STATUS that are not the state code
pub const TRX_STATUS_FLAGS_MASK: u8 = 0xE0;

pub const TRX_STATE_CMD_MASK: u8 = 0x1F;

pub const PHY_RSSI_RX_CRC_VALID: u8 = 0x80;
pub const PHY_RSSI_MASK: u8 = 0x1F;

pub const PHY_CC_CCA_REQUEST: u8 = 0x80;
pub const PHY_CC_CCA_MODE_MASK: u8 = 0x60;
pub const PHY_CC_CCA_CHANNEL_MASK: u8 = 0x1F;

pub const PHY_TX_PWR_MASK: u8 = 0x0F;

pub const CCA_THRES_ED_MASK: u8 = 0x0F;

pub const CSMA_SEED_1_AACK_DIS_ACK: u8 = 0x10;

/// PHY_ED_LEVEL value while a reception invalidates the last measurement
pub const ED_LEVEL_INVALID: u8 = 0xFF;

// ----------------------------------------------------------------------------
// Air interface
// ----------------------------------------------------------------------------

/// O-QPSK 2.4 GHz bit rate
pub const DEFAULT_BIT_RATE: u32 = 250_000;

/// Default MCU crystal frequency
pub const DEFAULT_CLOCK_HZ: u32 = 16_000_000;

/// PLL lock lead time before the first preamble byte
pub const DEFAULT_LEAD_BITS: u32 = 48;

/// Number of zero octets in the synchronisation header
pub const PREAMBLE_LEN: u8 = 4;

/// Start-of-frame delimiter (0x7A for compatibility with Sky/CC2420 nodes)
pub const SFD: u8 = 0x7A;

/// Byte the receiver looks for before the SFD
pub const PREAMBLE_BYTE: u8 = 0x00;

/// PHY length field mask (bit 7 is reserved)
pub const PHY_LENGTH_MASK: u8 = 0x7F;

/// Length of an immediate acknowledgment frame (FCF + DSN + FCS)
pub const ACK_FRAME_LEN: u8 = 5;

/// Positions at or below this byte count are checked by the frame filter
pub const ADDRESS_FILTER_SPAN: usize = 13;

/// Lowest channel of the 2.4 GHz band
pub const FIRST_CHANNEL: u8 = 11;
pub const FIRST_CHANNEL_MHZ: f64 = 2405.0;
pub const CHANNEL_SPACING_MHZ: f64 = 5.0;

// ----------------------------------------------------------------------------
// Protocol timing (in byte-times unless noted)
// ----------------------------------------------------------------------------

/// CCA measurement: 8.75 symbol periods = 140 us = 4.375 byte-times.
/// Expressed as a fraction of a byte-time: `CCA_DELAY_NUM / CCA_DELAY_DEN`.
pub const CCA_DELAY_NUM: u64 = 875;
pub const CCA_DELAY_DEN: u64 = 200;

/// Oscillator wake-up: 24 symbol periods = 384 us = 12 byte-times
pub const WAKEUP_DELAY_BYTES: u64 = 12;

/// ACK wait: 54 symbol periods = 864 us = 27 byte-times
pub const ACK_TIMEOUT_BYTES: u64 = 27;

// ----------------------------------------------------------------------------
// Broadcast identities
// ----------------------------------------------------------------------------

pub const SHORT_BROADCAST_ADDR: [u8; 2] = [0xFF, 0xFF];
pub const LONG_BROADCAST_ADDR: [u8; 8] = [0xFF; 8];
