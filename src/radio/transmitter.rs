//! # Transmitter
//!
//! Byte source for the medium. Once started, the medium pulls one byte per
//! byte-time:
//!
//! ```text
//! PREAMBLE (4 x 0x00) -> SFD (0x7A) -> LENGTH -> PAYLOAD -> CRC_HIGH -> CRC_LOW -> END -> WAIT
//! ```
//!
//! The frame comes from the frame buffer (`TRXFBST` holds the PHY length,
//! the PSDU follows) unless the transmitter was started to send an
//! automatic ACK, in which case the three ACK octets are synthesized.
//! Completion is handled in the same byte-time as the last CRC octet.

use super::crc::Crc16;
use super::events::RadioEvent;
use super::hal::Hal;
use super::irq::InterruptVector;
use super::power::PowerState;
use super::state::{PendingAck, RadioMode, TracStatus};
use super::Radio;
use crate::constants::{
    ACK_FRAME_LEN, PHY_LENGTH_MASK, PHY_TX_PWR, PREAMBLE_BYTE, PREAMBLE_LEN, SFD, TRXFBST,
    TRX_STATE,
};

/// FCF low byte: acknowledgment request
const FCF_ACK_REQUEST: u8 = 0x20;
/// FCF of an immediate acknowledgment frame
const ACK_FCF: [u8; 2] = [0x02, 0x00];

/// Transmitter states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxState {
    Preamble,
    Sfd,
    Length,
    Payload,
    CrcHigh,
    CrcLow,
    End,
    /// Parked until shut down
    #[default]
    Wait,
}

/// Where the PSDU comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxSource {
    #[default]
    FrameBuffer,
    /// Immediate ACK for the given sequence number
    Ack { dsn: u8 },
}

/// Transmitter bookkeeping, owned by the radio
#[derive(Debug, Clone, Default)]
pub struct Transmitter {
    pub(super) active: bool,
    pub(super) state: TxState,
    pub(super) source: TxSource,
    /// PSDU octets sent so far
    pub(super) counter: u8,
    /// PHY length of the frame being sent
    pub(super) length: u8,
    /// Next frame buffer address
    pub(super) ptr: u16,
    pub(super) crc: Crc16,
    /// Data frame requested an acknowledgment
    pub(super) wait_for_ack: bool,
}

impl Transmitter {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> TxState {
        self.state
    }

    pub fn source(&self) -> TxSource {
        self.source
    }

    /// State after the PSDU octets, given how many remain
    fn after_payload(&self) -> TxState {
        if self.length == 0 {
            TxState::End
        } else {
            TxState::CrcHigh
        }
    }

    fn payload_len(&self) -> u8 {
        self.length.saturating_sub(2)
    }
}

impl<H: Hal> Radio<H> {
    /// Produce the next byte on the air
    ///
    /// Called by the medium once per byte-time while the transmitter is
    /// registered.
    pub fn tx_next_byte(&mut self) -> u8 {
        if !self.tx.active {
            log::warn!("Transmitter polled while inactive");
            return 0;
        }
        if self.rx.active {
            log::warn!("Receiver active while transmitting");
        }

        let mut byte = 0;
        match self.tx.state {
            TxState::Preamble => {
                byte = PREAMBLE_BYTE;
                self.tx.counter += 1;
                if self.tx.counter >= PREAMBLE_LEN {
                    self.tx.state = TxState::Sfd;
                }
            }
            TxState::Sfd => {
                byte = SFD;
                self.tx.state = TxState::Length;
            }
            TxState::Length => {
                self.tx.length = match self.tx.source {
                    TxSource::Ack { .. } => ACK_FRAME_LEN,
                    TxSource::FrameBuffer => {
                        self.tx.ptr = TRXFBST;
                        let length = self.hal.read_data_byte(self.tx.ptr) & PHY_LENGTH_MASK;
                        self.tx.ptr += 1;
                        length
                    }
                };
                log::debug!("TX frame length {}", self.tx.length);
                self.tx.counter = 0;
                self.tx.crc.reset();
                self.tx.state = if self.tx.payload_len() == 0 {
                    self.tx.after_payload()
                } else {
                    TxState::Payload
                };
                byte = self.tx.length;
            }
            TxState::Payload => {
                byte = self.tx_payload_byte();
                self.tx.crc.push(byte);
                if self.tx.counter >= self.tx.payload_len() {
                    self.tx.state = self.tx.after_payload();
                }
            }
            TxState::CrcHigh => {
                byte = self.tx.crc.wire_bytes()[0];
                self.tx.state = if self.tx.length == 1 {
                    TxState::End
                } else {
                    TxState::CrcLow
                };
            }
            TxState::CrcLow => {
                byte = self.tx.crc.wire_bytes()[1];
                self.tx.state = TxState::End;
            }
            TxState::End | TxState::Wait => {}
        }

        log::trace!("TX 0x{byte:02X} -->");

        if self.tx.state == TxState::End {
            self.tx_frame_complete();
        }
        byte
    }

    fn tx_payload_byte(&mut self) -> u8 {
        let byte = match self.tx.source {
            TxSource::Ack { dsn } => {
                self.tx.wait_for_ack = false;
                match self.tx.counter {
                    0 => ACK_FCF[0],
                    1 => ACK_FCF[1],
                    _ => dsn,
                }
            }
            TxSource::FrameBuffer => {
                let byte = self.hal.read_data_byte(self.tx.ptr);
                self.tx.ptr += 1;
                if self.tx.counter == 0 {
                    self.tx.wait_for_ack = byte & FCF_ACK_REQUEST != 0;
                    if self.tx.wait_for_ack {
                        log::debug!("TX will wait for ACK");
                    }
                }
                byte
            }
        };
        self.tx.counter += 1;
        byte
    }

    /// Last octet is on the air: either wait for the ACK or report TX_END.
    fn tx_frame_complete(&mut self) {
        if self.tx.wait_for_ack && self.mode == RadioMode::BusyTxAret {
            self.pending_ack = PendingAck::Awaiting;
            self.ack_epoch = self.ack_epoch.wrapping_add(1);
            self.schedule(RadioEvent::AckTimeout {
                epoch: self.ack_epoch,
            });
            log::debug!("Frame sent, waiting for ACK");
            self.tx_shutdown();
            if self.rx.active {
                log::warn!("Receiver already active at end of transmission");
            } else {
                self.rx_startup();
            }
        } else {
            let sent_ack = matches!(self.tx.source, TxSource::Ack { .. });
            self.mode = RadioMode::PllOn;
            self.publish_status();
            self.hal.write_data_byte(TRX_STATE, TracStatus::Success.bits());
            self.tx_shutdown();
            if sent_ack {
                log::info!("ACK sent");
                self.ack_to_send = None;
            } else {
                log::info!("Frame sent ({} bytes)", self.tx.length);
            }
            self.raise(InterruptVector::TxEnd);
        }
        self.tx.state = TxState::Wait;
    }

    /// Start sending: a pending automatic ACK, otherwise the frame buffer.
    pub(super) fn tx_startup(&mut self) {
        if self.tx.active {
            log::warn!("Transmitter startup while active");
            return;
        }
        let pwr = self.hal.read_data_byte(PHY_TX_PWR);
        self.tx.active = true;
        self.tx.state = TxState::Preamble;
        self.tx.counter = 0;
        self.tx.wait_for_ack = false;
        self.tx.source = match self.ack_to_send {
            Some(dsn) if self.last_crc_ok => TxSource::Ack { dsn },
            _ => TxSource::FrameBuffer,
        };
        self.hal.transition(PowerState::transmit(pwr));
        let (power, frequency) = (self.tx_power_dbm(), self.frequency_mhz());
        self.hal
            .begin_transmit(power, frequency, self.config.lead_cycles(pwr));
        log::debug!("TX startup ({power} dBm, {frequency} MHz)");
    }

    pub(super) fn tx_shutdown(&mut self) {
        if !self.tx.active {
            log::warn!("Transmitter shutdown while inactive");
            return;
        }
        self.tx.active = false;
        self.hal.end_transmit();
        self.hal.transition(PowerState::Receive);
        log::debug!("TX shutdown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TRX_STATUS, XAH_CTRL_0};
    use crate::radio::{Command, RadioConfig};
    use crate::radio::hal::RegisterFile;
    use crate::sim::node::NodeHal;

    fn radio_with_frame(psdu: &[u8]) -> Radio<NodeHal> {
        let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
        radio.hal_mut().load_frame(psdu);
        radio
    }

    fn drain(radio: &mut Radio<NodeHal>) -> Vec<u8> {
        let mut bytes = Vec::new();
        while radio.is_transmitting() {
            bytes.push(radio.tx_next_byte());
            assert!(bytes.len() < 200, "transmitter never finished");
        }
        bytes
    }

    #[test]
    fn test_basic_frame_on_air() {
        let psdu = [0x41, 0x88, 0x07, 0xCD, 0xAB, 0xFF, 0xFF, 0x01, 0x00, 0x55];
        let mut radio = radio_with_frame(&psdu);
        radio.apply_command(Command::TxStart);

        let air = drain(&mut radio);
        let crc = Crc16::compute(&psdu).to_be_bytes();

        assert_eq!(&air[..4], &[0, 0, 0, 0]);
        assert_eq!(air[4], 0x7A);
        assert_eq!(air[5], 12);
        assert_eq!(&air[6..16], &psdu);
        assert_eq!(air[16], crate::util::rev8(crc[0]));
        assert_eq!(air[17], crate::util::rev8(crc[1]));
        assert_eq!(air.len(), 18);
    }

    #[test]
    fn test_basic_completion() {
        let mut radio = radio_with_frame(&[0x41, 0x88, 0x07]);
        radio.apply_command(Command::TxStart);
        drain(&mut radio);

        assert_eq!(radio.mode(), RadioMode::PllOn);
        assert_eq!(radio.read_register(TRX_STATUS), 0x09);
        assert_eq!(radio.read_register(TRX_STATE), 0x00);
        assert_eq!(radio.tx_state(), TxState::Wait);
        assert_eq!(radio.hal().interrupt_vectors(), vec![InterruptVector::TxEnd]);
        assert!(radio.hal().medium.transmitting.is_none());
        assert_eq!(radio.hal().power_log.last().map(|p| p.1), Some(PowerState::Receive));
    }

    #[test]
    fn test_ack_request_in_basic_mode_does_not_wait() {
        let mut radio = radio_with_frame(&[0x61, 0x88, 0x07, 0xCD, 0xAB, 0x02, 0x00]);
        radio.apply_command(Command::TxStart);
        drain(&mut radio);
        assert_eq!(radio.pending_ack(), PendingAck::NotRequested);
        assert_eq!(radio.mode(), RadioMode::PllOn);
    }

    #[test]
    fn test_aret_waits_for_ack() {
        let mut radio = radio_with_frame(&[0x61, 0x88, 0x07, 0xCD, 0xAB, 0x02, 0x00]);
        radio.apply_command(Command::TxAretOn);
        drain(&mut radio);

        assert_eq!(radio.mode(), RadioMode::BusyTxAret);
        assert_eq!(radio.pending_ack(), PendingAck::Awaiting);
        assert!(radio.is_receiving());
        assert!(radio.hal().interrupt_vectors().is_empty());
        assert_eq!(
            radio.hal().outbox,
            vec![(RadioEvent::AckTimeout { epoch: 1 }, 27 * 512)]
        );
    }

    #[test]
    fn test_ack_timeout_fails_transaction() {
        let mut radio = radio_with_frame(&[0x61, 0x88, 0x07, 0xCD, 0xAB, 0x02, 0x00]);
        radio.write_register(XAH_CTRL_0, 0x30);
        radio.apply_command(Command::TxAretOn);
        drain(&mut radio);

        radio.fire(RadioEvent::AckTimeout { epoch: 1 });
        assert_eq!(radio.pending_ack(), PendingAck::Failed);
        assert_eq!(radio.mode(), RadioMode::TxAretOn);
        assert_eq!(radio.read_register(TRX_STATE), 0xA0);
        assert!(!radio.is_receiving());
        assert_eq!(radio.hal().interrupt_vectors(), vec![InterruptVector::TxEnd]);
        // No retry despite a nonzero retry limit
        assert!(!radio.is_transmitting());
    }

    #[test]
    fn test_stale_ack_timeout_ignored() {
        let mut radio = radio_with_frame(&[0x61, 0x88, 0x07, 0xCD, 0xAB, 0x02, 0x00]);
        radio.apply_command(Command::TxAretOn);
        drain(&mut radio);
        radio.fire(RadioEvent::AckTimeout { epoch: 0 });
        assert_eq!(radio.pending_ack(), PendingAck::Awaiting);

        radio.apply_command(Command::RxAackOn);
        radio.fire(RadioEvent::AckTimeout { epoch: 1 });
        assert_eq!(radio.mode(), RadioMode::RxAackOn);
        assert!(radio.hal().interrupt_vectors().is_empty());
    }

    #[test]
    fn test_frame_length_masks_reserved_bit() {
        let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
        radio.hal_mut().write_data_byte(TRXFBST, 0x80 | 4);
        radio.apply_command(Command::TxStart);
        let air = drain(&mut radio);
        assert_eq!(air[5], 4);
        assert_eq!(air.len() - 6, 4);
    }

    #[test]
    fn test_degenerate_lengths_emit_exactly_length_bytes() {
        for length in 0..=3u8 {
            let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
            radio.hal_mut().write_data_byte(TRXFBST, length);
            radio.apply_command(Command::TxStart);
            let air = drain(&mut radio);
            assert_eq!(air.len() - 6, length as usize, "length {length}");
        }
    }

    #[test]
    fn test_startup_twice_is_harmless() {
        let mut radio = radio_with_frame(&[0x41, 0x88, 0x07]);
        radio.apply_command(Command::TxStart);
        radio.tx_next_byte();
        radio.tx_startup();
        // Still mid-preamble, not restarted
        assert_eq!(radio.tx_state(), TxState::Preamble);
        assert_eq!(radio.hal().medium_log.len(), 1);
    }
}
