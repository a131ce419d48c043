//! # Receiver
//!
//! Byte sink for the medium. The medium pushes one byte per byte-time along
//! with whether it still holds a channel lock for this receiver:
//!
//! ```text
//! SFD_SCAN --0x00--> SFD_MATCH_1 --0x7A--> SFD_MATCH_2 --len--> PAYLOAD
//!     ^                                                            |
//!     |                                          address reject -> WAIT
//!     |                                                            v
//!     +----------- END <-- CRC_LOW <-- CRC_HIGH <------------------+
//! ```
//!
//! The PSDU is stored at `TRXFBST`, followed by the link quality byte. The
//! receiver also keeps the bit error statistics that drive the link quality
//! estimate.

use super::crc::Crc16;
use super::filter::{self, LocalIdentity};
use super::hal::Hal;
use super::irq::InterruptVector;
use super::power::PowerState;
use super::state::{PendingAck, RadioMode, TracStatus};
use super::Radio;
use crate::constants::{
    ACK_FRAME_LEN, ADDRESS_FILTER_SPAN, CSMA_SEED_1, CSMA_SEED_1_AACK_DIS_ACK, ED_LEVEL_INVALID,
    FRAME_BUFFER_LEN, PHY_ED_LEVEL, PHY_LENGTH_MASK, PHY_RSSI, PHY_RSSI_MASK,
    PHY_RSSI_RX_CRC_VALID, PREAMBLE_BYTE, SFD, TRXFBST, TRX_STATE, TST_RX_LENGTH,
};
use crate::util::logging::log_frame_hex;
use rand::Rng;

/// FCF low byte: acknowledgment request
const FCF_ACK_REQUEST: u8 = 0x20;
/// Frame type of an acknowledgment
const FRAME_TYPE_ACK: u8 = 0x02;
/// Highest value of `PHY_RSSI[4:0]`
const RSSI_MAX: i32 = 28;
/// Bytes of synchronisation header excluded from the bit error average
const SHR_BYTES: u32 = 5;

/// Maximum correlation value for each packet error rate percentage
const CORR_MAX: [u8; 101] = [
    110, 109, 109, 109, 107, 107, 107, 107, 107, 107, 107, 107, 103, 102, 102, 102, 101, 101, 101,
    101, 99, 94, 92, 94, 101, 97, 98, 97, 97, 97, 97, 97, 94, 94, 94, 94, 94, 94, 94, 94, 94, 94,
    94, 94, 92, 89, 89, 89, 89, 89, 88, 88, 88, 88, 88, 86, 86, 86, 86, 86, 86, 86, 86, 86, 85, 85,
    85, 85, 85, 85, 83, 83, 83, 83, 83, 83, 83, 83, 79, 78, 78, 78, 78, 78, 76, 76, 76, 74, 74, 74,
    74, 74, 74, 74, 74, 74, 74, 66, 65, 65, 65,
];

/// Minimum correlation value for each packet error rate percentage
const CORR_MIN: [u8; 101] = [
    95, 95, 94, 91, 90, 90, 89, 89, 89, 88, 88, 88, 82, 82, 82, 82, 76, 76, 76, 76, 76, 76, 74, 74,
    74, 74, 74, 74, 72, 72, 72, 72, 72, 72, 72, 72, 69, 69, 69, 69, 69, 69, 69, 69, 69, 69, 69, 69,
    69, 69, 69, 69, 69, 69, 69, 69, 67, 67, 67, 67, 67, 67, 65, 65, 65, 65, 65, 65, 65, 64, 64, 63,
    63, 63, 63, 63, 63, 63, 63, 63, 61, 61, 61, 60, 60, 60, 58, 58, 56, 56, 56, 55, 55, 55, 50, 50,
    50, 50, 50, 50, 50,
];

/// Receiver states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RxState {
    #[default]
    SfdScan,
    SfdMatch1,
    SfdMatch2,
    Payload,
    CrcHigh,
    CrcLow,
    /// Frame finished; the next call decides between ACK and scanning
    End,
    /// Frame buffer overflow, left only by `reset_overflow`
    Overflow,
    /// Frame rejected, skipping its remaining bytes
    Wait,
}

/// Receiver bookkeeping, owned by the radio
#[derive(Debug, Clone, Default)]
pub struct Receiver {
    pub(super) active: bool,
    pub(super) state: RxState,
    /// PSDU octets received so far
    pub(super) counter: u8,
    /// PHY length of the frame being received
    pub(super) length: u8,
    /// Next frame buffer address
    pub(super) ptr: u16,
    pub(super) crc: Crc16,
    /// First CRC octet as received
    pub(super) crc_first: u8,
    pub(super) ber_total: f64,
    pub(super) ber_count: u32,
}

impl Receiver {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    fn clear_ber(&mut self) {
        self.ber_count = 0;
        self.ber_total = 0.0;
    }
}

impl<H: Hal> Radio<H> {
    /// Consume the next byte from the air
    ///
    /// `locked` is false when the medium no longer delivers the frame this
    /// receiver synchronised on. Returns the byte as received, or 0 while the
    /// receiver is off.
    pub fn rx_next_byte(&mut self, locked: bool, byte: u8) -> u8 {
        if !self.rx.active {
            return 0;
        }

        if self.rx.state == RxState::End {
            self.rx.state = RxState::SfdScan;
            if self.ack_to_send.is_some() && self.last_crc_ok {
                log::debug!("Sending ACK");
                self.rx_shutdown();
                self.tx_startup();
            } else if locked {
                log::debug!("Channel still locked after frame end");
            }
            return byte;
        }

        if !locked {
            self.rx_lock_lost();
            return byte;
        }

        if self.tx.active {
            log::warn!("Transmitter active while receiving ({:?})", self.rx.state);
            self.tx_shutdown();
        }

        log::trace!("RX <-- 0x{byte:02X}");

        match self.rx.state {
            RxState::SfdMatch1 if byte == SFD => self.rx_sfd_matched(),
            RxState::SfdScan | RxState::SfdMatch1 => {
                self.rx.state = if byte == PREAMBLE_BYTE {
                    RxState::SfdMatch1
                } else {
                    RxState::SfdScan
                };
            }
            RxState::SfdMatch2 => self.rx_length(byte),
            RxState::Payload => self.rx_payload(byte),
            RxState::CrcHigh => {
                if self.rx_store(byte) {
                    self.rx.crc_first = byte;
                    self.rx.state = RxState::CrcLow;
                }
            }
            RxState::CrcLow => self.rx_crc_complete(byte),
            RxState::Overflow => {}
            RxState::Wait => {
                self.rx.counter = self.rx.counter.saturating_add(1);
                if self.rx.counter >= self.rx.length {
                    self.rx_discard();
                }
            }
            RxState::End => {}
        }
        byte
    }

    fn rx_lock_lost(&mut self) {
        match self.rx.state {
            RxState::SfdMatch2 | RxState::Payload | RxState::CrcHigh | RxState::CrcLow => {
                log::debug!("Lock lost in {:?}, frame dropped", self.rx.state);
                self.raise(InterruptVector::PllUnlock);
                self.rx.state = RxState::SfdScan;
                self.rx_frame_start();
            }
            RxState::SfdMatch1 => self.rx.state = RxState::SfdScan,
            RxState::Wait => self.rx_discard(),
            _ => {}
        }
    }

    /// Drop a skipped frame and go back to listening.
    fn rx_discard(&mut self) {
        self.rx.clear_ber();
        self.rx.state = RxState::SfdScan;
        if matches!(self.mode, RadioMode::BusyRx | RadioMode::BusyRxAack) {
            self.mode = RadioMode::RxAackOn;
            self.publish_status_preserving();
        }
    }

    /// Invalidate the last reception and enter the busy receive mode.
    fn rx_frame_start(&mut self) {
        let rssi = self.hal.read_data_byte(PHY_RSSI);
        self.hal
            .write_data_byte(PHY_RSSI, rssi & !PHY_RSSI_RX_CRC_VALID);
        self.hal.write_data_byte(PHY_ED_LEVEL, ED_LEVEL_INVALID);
        if let Some(busy) = self.mode.busy_receive_variant() {
            self.mode = busy;
        }
        self.publish_status_preserving();
        self.raise(InterruptVector::RxStart);
    }

    fn rx_sfd_matched(&mut self) {
        self.rx.state = RxState::SfdMatch2;
        if self.pending_ack.is_awaiting() {
            return;
        }
        match self.mode {
            mode if mode.is_listening() => {}
            RadioMode::BusyRx | RadioMode::BusyRxAack => {
                log::warn!("SFD while already in {}, previous frame end missed", self.mode);
            }
            other => {
                log::warn!("SFD while not in a receive state ({other})");
                return;
            }
        }
        self.rx_frame_start();
    }

    fn rx_length(&mut self, byte: u8) {
        let length = byte & PHY_LENGTH_MASK;
        if length == 0 {
            self.rx.state = RxState::SfdScan;
            return;
        }
        self.hal.write_data_byte(TST_RX_LENGTH, length);
        self.rx.length = length;
        self.rx.counter = 0;
        self.rx.state = RxState::Payload;

        if self.pending_ack.is_awaiting() {
            if length != ACK_FRAME_LEN {
                log::info!("Expected ACK, got a {length} byte frame");
                self.pending_ack = PendingAck::Failed;
                self.mode = RadioMode::TxAretOn;
                self.publish_status_preserving();
                self.hal.write_data_byte(TRX_STATE, TracStatus::NoAck.bits());
                self.rx.state = RxState::SfdScan;
                self.raise(InterruptVector::TxEnd);
                self.rx_shutdown();
            }
            return;
        }

        if length < 3 {
            // No room for an FCS, skip the frame
            self.rx.state = RxState::Wait;
            return;
        }
        self.rx.ptr = TRXFBST;
        self.rx.crc.reset();
        let rssi = self.hal.read_data_byte(PHY_RSSI) & PHY_RSSI_MASK;
        self.hal.write_data_byte(PHY_ED_LEVEL, rssi * 3);
    }

    fn rx_payload(&mut self, byte: u8) {
        self.rx.counter += 1;

        if self.pending_ack.is_awaiting() {
            if self.rx.counter == ACK_FRAME_LEN {
                log::info!("ACK received");
                self.pending_ack = PendingAck::Succeeded;
                self.mode = RadioMode::TxAretOn;
                self.publish_status_preserving();
                self.hal.write_data_byte(TRX_STATE, TracStatus::Success.bits());
                self.rx_shutdown();
                self.raise(InterruptVector::TxEnd);
            }
            return;
        }

        if !self.rx_store(byte) {
            return;
        }

        let position = self.rx.counter as usize;
        if position <= ADDRESS_FILTER_SPAN {
            let header: Vec<u8> = (0..position as u16)
                .map(|i| self.hal.read_data_byte(TRXFBST + i))
                .collect();
            if let Some(dsn) = filter::sequence_number(position, &header) {
                self.dsn = dsn;
                self.last_crc_ok = false;
            }
            let identity = LocalIdentity::read(&self.hal);
            if !filter::match_address(position, &header, &identity) {
                log::debug!("No address match at byte {position}, skipping frame");
                self.rx.state = RxState::Wait;
                return;
            }
        }

        self.rx.crc.push(byte);
        if self.rx.counter == self.rx.length - 2 {
            self.rx.state = RxState::CrcHigh;
        }
    }

    fn rx_crc_complete(&mut self, byte: u8) {
        if !self.rx_store(byte) {
            return;
        }
        self.rx.state = RxState::End;

        let received = Crc16::from_wire(self.rx.crc_first, byte);
        let crc_ok = received == self.rx.crc.value();
        self.last_crc_ok = crc_ok;

        let mut lqi = self.correlation() & 0x7F;
        if crc_ok {
            lqi |= 0x80;
            let rssi = self.hal.read_data_byte(PHY_RSSI);
            self.hal
                .write_data_byte(PHY_RSSI, rssi | PHY_RSSI_RX_CRC_VALID);
        } else {
            log::info!(
                "CRC error: received 0x{received:04X}, calculated 0x{:04X}",
                self.rx.crc.value()
            );
        }
        self.rx_store(lqi);

        if log::log_enabled!(log::Level::Debug) {
            let frame: Vec<u8> = (0..self.rx.length as u16)
                .map(|i| self.hal.read_data_byte(TRXFBST + i))
                .collect();
            log_frame_hex("RX frame", &frame);
        }
        self.raise(InterruptVector::RxEnd);

        if matches!(self.mode, RadioMode::BusyTxAret | RadioMode::TxAretOn) {
            log::warn!("Frame completed in {}", self.mode);
        }

        let fcf = self.hal.read_data_byte(TRXFBST);
        let ack_disabled = self.hal.read_data_byte(CSMA_SEED_1) & CSMA_SEED_1_AACK_DIS_ACK != 0;
        if crc_ok
            && self.mode == RadioMode::BusyRxAack
            && fcf & FCF_ACK_REQUEST != 0
            && !ack_disabled
            && fcf & 0x07 != FRAME_TYPE_ACK
        {
            log::debug!("ACK requested for DSN {}", self.dsn);
            self.ack_to_send = Some(self.dsn);
        } else {
            self.ack_to_send = None;
            self.mode = RadioMode::RxAackOn;
            self.publish_status_preserving();
        }
    }

    /// Store a received byte; false once the frame buffer is full.
    fn rx_store(&mut self, byte: u8) -> bool {
        if self.rx.ptr >= TRXFBST + FRAME_BUFFER_LEN {
            log::warn!("Frame buffer overflow");
            self.rx.state = RxState::Overflow;
            return false;
        }
        self.hal.write_data_byte(self.rx.ptr, byte);
        self.rx.ptr += 1;
        true
    }

    /// Leave the overflow state and resume scanning.
    pub fn reset_overflow(&mut self) {
        self.rx.state = RxState::SfdScan;
    }

    pub(super) fn rx_startup(&mut self) {
        if self.rx.active {
            log::warn!("Receiver startup while active");
            return;
        }
        self.rx.active = true;
        self.hal.transition(PowerState::Receive);
        self.rx.state = RxState::SfdScan;
        self.rx.clear_ber();
        let frequency = self.frequency_mhz();
        self.hal.begin_receive(frequency);
        log::debug!("RX startup ({frequency} MHz)");
    }

    pub(super) fn rx_shutdown(&mut self) {
        if !self.rx.active {
            log::warn!("Receiver shutdown while inactive");
            return;
        }
        self.rx.active = false;
        self.hal.end_receive();
        self.rx.state = RxState::SfdScan;
        self.hal.transition(PowerState::Idle);
        log::debug!("RX shutdown");
    }

    // ------------------------------------------------------------------
    // Signal quality
    // ------------------------------------------------------------------

    /// Set the received signal strength seen by the receiver
    ///
    /// `PHY_RSSI[4:0]` counts 3 dB steps above -90 dBm, clamped to 0..=28.
    pub fn set_signal_level(&mut self, dbm: f64) {
        let level = ((dbm.round_ties_even() as i32 + 90) / 3 + 1).clamp(0, RSSI_MAX) as u8;
        let rssi = self.hal.read_data_byte(PHY_RSSI);
        self.hal
            .write_data_byte(PHY_RSSI, level | (rssi & !PHY_RSSI_MASK));
    }

    /// Received signal strength in dBm, from `PHY_RSSI[4:0]`
    pub fn signal_level(&self) -> f64 {
        let level = (self.hal.read_data_byte(PHY_RSSI) & PHY_RSSI_MASK) as i32;
        (-90 + 3 * (level - 1)) as f64
    }

    /// Record the bit error rate of the byte about to be delivered
    pub fn record_bit_error(&mut self, ber: f64) {
        self.rx.ber_count += 1;
        if self.rx.ber_count > SHR_BYTES {
            self.rx.ber_total += ber;
        }
    }

    /// Packet error rate implied by the bit errors since the SHR
    ///
    /// Resets the statistics.
    pub fn derive_packet_error_rate(&mut self) -> f64 {
        let mut per = 0.0;
        if self.rx.ber_count > SHR_BYTES {
            let bytes = self.rx.ber_count - SHR_BYTES;
            let ber = self.rx.ber_total / bytes as f64;
            per = 1.0 - (1.0 - ber).powi((bytes * 8) as i32);
        }
        self.rx.clear_ber();
        per
    }

    /// Correlation value drawn from the range for the current error rate.
    fn correlation(&mut self) -> u8 {
        let per = self.derive_packet_error_rate();
        let index = ((per * 100.0) as usize).min(CORR_MAX.len() - 1);
        let (min, max) = (CORR_MIN[index], CORR_MAX[index]);
        self.rng.gen_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{PAN_ID_0, SHORT_ADDR_0, TRX_STATUS};
    use crate::radio::{Command, RadioConfig};
    use crate::sim::node::NodeHal;
    use crate::radio::hal::RegisterFile;

    const PAN: [u8; 2] = [0xCD, 0xAB];
    const SHORT: [u8; 2] = [0x02, 0x00];

    fn listening_radio(cmd: Command) -> Radio<NodeHal> {
        let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
        radio.write_register(PAN_ID_0, PAN[0]);
        radio.write_register(PAN_ID_0 + 1, PAN[1]);
        radio.write_register(SHORT_ADDR_0, SHORT[0]);
        radio.write_register(SHORT_ADDR_0 + 1, SHORT[1]);
        radio.apply_command(cmd);
        radio
    }

    /// SHR, PHR, PSDU and a correct FCS as they appear on the air
    fn on_air(psdu: &[u8]) -> Vec<u8> {
        let mut air = vec![0, 0, 0, 0, SFD, psdu.len() as u8 + 2];
        air.extend_from_slice(psdu);
        let mut crc = Crc16::new();
        psdu.iter().for_each(|&b| crc.push(b));
        air.extend_from_slice(&crc.wire_bytes());
        air
    }

    fn data_frame(dst: [u8; 2], ack: bool) -> Vec<u8> {
        let fcf0 = if ack { 0x61 } else { 0x41 };
        vec![fcf0, 0x88, 0x2A, PAN[0], PAN[1], dst[0], dst[1], 0x01, 0x00, 0xDE, 0xAD]
    }

    fn feed(radio: &mut Radio<NodeHal>, bytes: &[u8]) {
        for &b in bytes {
            radio.rx_next_byte(true, b);
        }
    }

    #[test]
    fn test_sfd_scan_transitions() {
        let mut radio = listening_radio(Command::RxOn);
        feed(&mut radio, &[0x55]);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        feed(&mut radio, &[0x00]);
        assert_eq!(radio.rx_state(), RxState::SfdMatch1);
        feed(&mut radio, &[0x00]);
        assert_eq!(radio.rx_state(), RxState::SfdMatch1);
        // A failed second match falls back to scanning with the same byte
        feed(&mut radio, &[0x33]);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        feed(&mut radio, &[0x00, SFD]);
        assert_eq!(radio.rx_state(), RxState::SfdMatch2);
        assert_eq!(radio.mode(), RadioMode::BusyRx);
        assert_eq!(radio.hal().interrupt_vectors(), vec![InterruptVector::RxStart]);
        assert_eq!(radio.read_register(PHY_ED_LEVEL), ED_LEVEL_INVALID);
    }

    #[test]
    fn test_receive_frame_without_ack() {
        let mut radio = listening_radio(Command::RxOn);
        let psdu = data_frame(SHORT, false);
        feed(&mut radio, &on_air(&psdu));

        assert_eq!(radio.rx_state(), RxState::End);
        assert!(radio.last_crc_ok());
        // Every completed frame without an ACK lands in the AACK listening mode
        assert_eq!(radio.mode(), RadioMode::RxAackOn);
        assert_eq!(
            radio.read_register(TRX_STATUS) & 0x1F,
            RadioMode::RxAackOn.status_code()
        );
        assert_eq!(radio.read_register(TST_RX_LENGTH), 13);
        for (i, &b) in psdu.iter().enumerate() {
            assert_eq!(radio.read_register(TRXFBST + i as u16), b);
        }
        let lqi = radio.read_register(TRXFBST + 13);
        assert_eq!(lqi & 0x80, 0x80);
        assert!((95..=110).contains(&(lqi & 0x7F)));
        assert_eq!(radio.read_register(PHY_RSSI) & PHY_RSSI_RX_CRC_VALID, PHY_RSSI_RX_CRC_VALID);
        assert_eq!(
            radio.hal().interrupt_vectors(),
            vec![InterruptVector::RxStart, InterruptVector::RxEnd]
        );

        radio.rx_next_byte(false, 0);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        assert!(radio.is_receiving());
    }

    #[test]
    fn test_ack_requested_in_aack_mode() {
        let mut radio = listening_radio(Command::RxAackOn);
        feed(&mut radio, &on_air(&data_frame(SHORT, true)));

        assert_eq!(radio.mode(), RadioMode::BusyRxAack);
        assert_eq!(radio.ack_to_send(), Some(0x2A));

        // END: receiver hands over to the transmitter
        radio.rx_next_byte(false, 0);
        assert!(!radio.is_receiving());
        assert!(radio.is_transmitting());
        assert_eq!(radio.tx_state(), crate::radio::TxState::Preamble);
        assert_eq!(
            radio.tx.source,
            crate::radio::transmitter::TxSource::Ack { dsn: 0x2A }
        );
    }

    #[test]
    fn test_ack_obligation_dropped_when_radio_forced_off() {
        let mut radio = listening_radio(Command::RxAackOn);
        feed(&mut radio, &on_air(&data_frame(SHORT, true)));
        assert_eq!(radio.ack_to_send(), Some(0x2A));

        // Forced off before END hands over to the transmitter
        radio.apply_command(Command::ForceTrxOff);
        radio.apply_command(Command::RxAackOn);

        let broadcast = vec![0x41, 0x88, 0x33, PAN[0], PAN[1], 0xFF, 0xFF, 0x01, 0x00, 0xBE, 0xEF];
        feed(&mut radio, &on_air(&broadcast));
        assert!(radio.last_crc_ok());
        assert_eq!(radio.ack_to_send(), None);
        assert_eq!(radio.mode(), RadioMode::RxAackOn);

        radio.rx_next_byte(false, 0);
        assert!(radio.is_receiving());
        assert!(!radio.is_transmitting());
    }

    #[test]
    fn test_skipped_frame_in_rx_on_returns_to_aack_listening() {
        let mut radio = listening_radio(Command::RxOn);
        let air = on_air(&data_frame([0x07, 0x00], false));
        feed(&mut radio, &air[..13]);
        assert_eq!(radio.rx_state(), RxState::Wait);
        assert_eq!(radio.mode(), RadioMode::BusyRx);

        feed(&mut radio, &air[13..]);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        assert_eq!(radio.mode(), RadioMode::RxAackOn);
    }

    #[test]
    fn test_ack_suppressed_by_aack_dis_ack() {
        let mut radio = listening_radio(Command::RxAackOn);
        radio.write_register(CSMA_SEED_1, CSMA_SEED_1_AACK_DIS_ACK);
        feed(&mut radio, &on_air(&data_frame(SHORT, true)));
        assert_eq!(radio.ack_to_send(), None);
        assert_eq!(radio.mode(), RadioMode::RxAackOn);
    }

    #[test]
    fn test_crc_failure() {
        let mut radio = listening_radio(Command::RxAackOn);
        let mut air = on_air(&data_frame(SHORT, true));
        air[15] ^= 0x01;
        feed(&mut radio, &air);

        assert!(!radio.last_crc_ok());
        assert_eq!(radio.ack_to_send(), None);
        assert_eq!(radio.mode(), RadioMode::RxAackOn);
        assert_eq!(radio.read_register(TRXFBST + 13) & 0x80, 0);
        assert_eq!(radio.read_register(PHY_RSSI) & PHY_RSSI_RX_CRC_VALID, 0);

        radio.rx_next_byte(true, 0);
        assert!(radio.is_receiving());
        assert!(!radio.is_transmitting());
    }

    #[test]
    fn test_address_reject_enters_wait_at_byte_7() {
        let mut radio = listening_radio(Command::RxAackOn);
        let air = on_air(&data_frame([0x07, 0x00], true));
        // SHR + PHR + 6 PSDU bytes
        feed(&mut radio, &air[..12]);
        assert_eq!(radio.rx_state(), RxState::Payload);
        feed(&mut radio, &air[12..13]);
        assert_eq!(radio.rx_state(), RxState::Wait);

        // Remaining PSDU bytes (4 + 2 FCS) are consumed, then scanning resumes
        feed(&mut radio, &air[13..18]);
        assert_eq!(radio.rx_state(), RxState::Wait);
        feed(&mut radio, &air[18..]);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        assert_eq!(radio.mode(), RadioMode::RxAackOn);
        assert!(!radio.hal().interrupt_vectors().contains(&InterruptVector::RxEnd));
    }

    #[test]
    fn test_zero_length_dropped() {
        let mut radio = listening_radio(Command::RxOn);
        feed(&mut radio, &[0, 0, 0, 0, SFD, 0x00]);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        // The reserved bit of the PHR is ignored
        feed(&mut radio, &[0, SFD, 0x80]);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
    }

    #[test]
    fn test_lock_lost_mid_frame() {
        let mut radio = listening_radio(Command::RxAackOn);
        let air = on_air(&data_frame(SHORT, false));
        feed(&mut radio, &air[..9]);
        assert_eq!(radio.rx_state(), RxState::Payload);

        radio.rx_next_byte(false, 0);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        assert_eq!(
            radio.hal().interrupt_vectors(),
            vec![
                InterruptVector::RxStart,
                InterruptVector::PllUnlock,
                InterruptVector::RxStart
            ]
        );
        assert_eq!(radio.mode(), RadioMode::BusyRxAack);
        assert_eq!(radio.read_register(PHY_ED_LEVEL), ED_LEVEL_INVALID);
    }

    #[test]
    fn test_lock_lost_after_first_sync_byte() {
        let mut radio = listening_radio(Command::RxOn);
        feed(&mut radio, &[0x00]);
        radio.rx_next_byte(false, 0);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
        assert_eq!(radio.mode(), RadioMode::RxOn);
        assert!(radio.hal().interrupt_vectors().is_empty());
    }

    #[test]
    fn test_awaited_ack_success() {
        let mut radio = listening_radio(Command::RxAackOn);
        radio.pending_ack = PendingAck::Awaiting;
        radio.mode = RadioMode::BusyTxAret;
        let ack = on_air(&[0x02, 0x00, 0x2A]);
        feed(&mut radio, &ack);

        assert_eq!(radio.pending_ack(), PendingAck::Succeeded);
        assert_eq!(radio.mode(), RadioMode::TxAretOn);
        assert_eq!(radio.read_register(TRX_STATE) >> 5, 0);
        assert_eq!(radio.read_register(TRX_STATUS) & 0x1F, 0x19);
        assert!(!radio.is_receiving());
        assert_eq!(radio.hal().interrupt_vectors(), vec![InterruptVector::TxEnd]);
    }

    #[test]
    fn test_awaited_ack_wrong_length() {
        let mut radio = listening_radio(Command::RxAackOn);
        radio.pending_ack = PendingAck::Awaiting;
        radio.mode = RadioMode::BusyTxAret;
        feed(&mut radio, &on_air(&data_frame(SHORT, false))[..6]);

        assert_eq!(radio.pending_ack(), PendingAck::Failed);
        assert_eq!(radio.mode(), RadioMode::TxAretOn);
        assert_eq!(radio.read_register(TRX_STATE), 0xA0);
        assert!(!radio.is_receiving());
        assert_eq!(radio.hal().interrupt_vectors(), vec![InterruptVector::TxEnd]);
    }

    #[test]
    fn test_signal_level_encoding() {
        let mut radio = listening_radio(Command::RxOn);
        radio.hal_mut().write_data_byte(PHY_RSSI, 0x80);

        radio.set_signal_level(-60.0);
        assert_eq!(radio.read_register(PHY_RSSI), 0x80 | 11);
        assert_eq!(radio.signal_level(), -60.0);

        radio.set_signal_level(-120.0);
        assert_eq!(radio.read_register(PHY_RSSI) & PHY_RSSI_MASK, 0);
        radio.set_signal_level(0.0);
        assert_eq!(radio.read_register(PHY_RSSI) & PHY_RSSI_MASK, 28);
        assert_eq!(radio.read_register(PHY_RSSI) & 0x80, 0x80);
    }

    #[test]
    fn test_packet_error_rate() {
        let mut radio = listening_radio(Command::RxOn);
        for _ in 0..5 {
            radio.record_bit_error(0.5);
        }
        // SHR bytes only: no estimate
        assert_eq!(radio.derive_packet_error_rate(), 0.0);

        for _ in 0..15 {
            radio.record_bit_error(0.01);
        }
        let per = radio.derive_packet_error_rate();
        let expected = 1.0 - 0.99f64.powi(80);
        assert!((per - expected).abs() < 1e-12);
        // Statistics were cleared
        assert_eq!(radio.derive_packet_error_rate(), 0.0);
    }

    #[test]
    fn test_correlation_tables_are_ranges() {
        assert!(CORR_MIN.iter().zip(CORR_MAX.iter()).all(|(min, max)| min <= max));
    }

    #[test]
    fn test_inactive_receiver_ignores_bytes() {
        let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
        assert_eq!(radio.rx_next_byte(true, 0x7A), 0);
        assert_eq!(radio.rx_state(), RxState::SfdScan);
    }

    #[test]
    fn test_overflow_and_reset() {
        let mut radio = listening_radio(Command::RxOn);
        feed(&mut radio, &[0, SFD, 0x7F]);
        radio.rx.ptr = TRXFBST + FRAME_BUFFER_LEN;
        feed(&mut radio, &[0x41]);
        assert_eq!(radio.rx_state(), RxState::Overflow);
        feed(&mut radio, &[0x00, 0x00]);
        assert_eq!(radio.rx_state(), RxState::Overflow);
        radio.reset_overflow();
        assert_eq!(radio.rx_state(), RxState::SfdScan);
    }
}
