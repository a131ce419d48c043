//! # ATmega128RFA1 Radio Controller
//!
//! Cycle-accurate model of the IEEE 802.15.4 transceiver built into the
//! ATmega128RFA1. Firmware drives it purely through memory-mapped registers;
//! the model answers with register updates, interrupts and bytes on the
//! shared medium, all as a deterministic function of simulated time.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │   Firmware (register writes, SLPTR pin)      │
//! ├──────────────────────────────────────────────┤
//! │   Radio<H>: controller, mode, pending ACK    │
//! │   ├── transmitter (byte source)              │
//! │   ├── receiver + address filter (byte sink)  │
//! │   └── timed events (CCA, wake-up, ACK wait)  │
//! ├──────────────────────────────────────────────┤
//! │   Hal: registers, IRQs, medium, clock, power │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Exactly one of transmitter and receiver is active at a time; the
//! controller always shuts one down before starting the other.
//!
//! ## Usage Example
//!
//! ```rust
//! use rfa1_radio::radio::{Command, Radio, RadioConfig, RadioMode};
//! use rfa1_radio::sim::node::NodeHal;
//!
//! let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
//! assert_eq!(radio.mode(), RadioMode::TrxOff);
//!
//! radio.apply_command(Command::RxAackOn);
//! assert_eq!(radio.mode(), RadioMode::RxAackOn);
//! assert!(radio.is_receiving());
//! ```

pub mod config;
pub mod crc;
pub mod events;
pub mod filter;
pub mod hal;
pub mod irq;
pub mod power;
pub mod receiver;
pub mod state;
pub mod transmitter;

pub use config::RadioConfig;
pub use events::RadioEvent;
pub use hal::{Hal, InterruptSink, Medium, PowerObserver, RegisterFile, Scheduler};
pub use irq::{InterruptVector, IrqFlags};
pub use power::PowerState;
pub use receiver::{Receiver, RxState};
pub use state::{Command, PendingAck, RadioMode, TracStatus};
pub use transmitter::{Transmitter, TxState};

use crate::constants::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Simulated ATmega128RFA1 transceiver
///
/// ## Type Parameters
///
/// * `H` - Host services (register file, interrupts, medium, clock, power)
pub struct Radio<H: Hal> {
    /// Host services
    hal: H,
    /// Timing configuration
    config: RadioConfig,
    /// MCU cycles per byte-time, cached from `config`
    cycles_per_byte: u64,
    /// Top-level operating mode, mirrored to `TRX_STATUS[4:0]`
    mode: RadioMode,
    tx: Transmitter,
    rx: Receiver,
    /// Outcome of the current extended-mode transmission
    pending_ack: PendingAck,
    /// Tags the ACK timeout of the current transmission
    ack_epoch: u32,
    /// Sequence number of a received frame still to be acknowledged
    ack_to_send: Option<u8>,
    /// Sequence number captured from the frame being received
    dsn: u8,
    /// CRC outcome of the last received frame
    last_crc_ok: bool,
    /// `XAH_CTRL_0` retry limits latched by TX_ARET_ON
    frame_retries: u8,
    csma_retries: u8,
    /// CCA measurements in flight
    cca_in_flight: u8,
    /// Wake-up scheduled after SLPTR went low
    wake_pending: bool,
    /// Link-quality generator
    rng: StdRng,
}

impl<H: Hal> Radio<H> {
    /// Create a radio in TRX_OFF
    ///
    /// # Arguments
    ///
    /// * `hal` - Host services implementation
    /// * `config` - Clock, bit rate and link-quality seed
    pub fn new(hal: H, config: RadioConfig) -> Self {
        let mut radio = Self {
            hal,
            cycles_per_byte: config.cycles_per_byte(),
            config,
            mode: RadioMode::TrxOff,
            tx: Transmitter::default(),
            rx: Receiver::default(),
            pending_ack: PendingAck::NotRequested,
            ack_epoch: 0,
            ack_to_send: None,
            dsn: 0,
            last_crc_ok: false,
            frame_retries: 0,
            csma_retries: 0,
            cca_in_flight: 0,
            wake_pending: false,
            rng: StdRng::seed_from_u64(config.seed),
        };
        radio.reset();
        radio
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn mode(&self) -> RadioMode {
        self.mode
    }

    pub fn pending_ack(&self) -> PendingAck {
        self.pending_ack
    }

    /// CRC outcome of the most recently received frame
    pub fn last_crc_ok(&self) -> bool {
        self.last_crc_ok
    }

    /// Sequence number of a received frame that will be acknowledged
    pub fn ack_to_send(&self) -> Option<u8> {
        self.ack_to_send
    }

    /// Retry limits latched by the last TX_ARET_ON (frame, CSMA)
    pub fn retry_limits(&self) -> (u8, u8) {
        (self.frame_retries, self.csma_retries)
    }

    pub fn is_transmitting(&self) -> bool {
        self.tx.active
    }

    pub fn is_receiving(&self) -> bool {
        self.rx.active
    }

    pub fn tx_state(&self) -> TxState {
        self.tx.state
    }

    pub fn rx_state(&self) -> RxState {
        self.rx.state
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn cycles_per_byte(&self) -> u64 {
        self.cycles_per_byte
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    pub fn into_hal(self) -> H {
        self.hal
    }

    /// Output power in dBm from `PHY_TX_PWR[3:0]`
    pub fn tx_power_dbm(&self) -> f64 {
        power::tx_power_dbm(self.hal.read_data_byte(PHY_TX_PWR))
    }

    /// Channel number from `PHY_CC_CCA[4:0]`
    pub fn channel(&self) -> u8 {
        self.hal.read_data_byte(PHY_CC_CCA) & PHY_CC_CCA_CHANNEL_MASK
    }

    /// Carrier frequency of the current channel
    pub fn frequency_mhz(&self) -> f64 {
        FIRST_CHANNEL_MHZ + CHANNEL_SPACING_MHZ * (self.channel() as f64 - FIRST_CHANNEL as f64)
    }

    // ------------------------------------------------------------------
    // Register interface
    // ------------------------------------------------------------------

    /// Handle a firmware write to data memory
    ///
    /// Writes to the transceiver control registers trigger their side effects
    /// before the value is stored. Returns the value actually latched.
    pub fn write_register(&mut self, addr: u16, value: u8) -> u8 {
        let latched = match addr {
            TRX_STATE => match Command::from_code(value) {
                Some(cmd) => self.apply_command(cmd) | (value & !TRX_STATE_CMD_MASK),
                None => {
                    log::warn!("Invalid TRX_CMD 0x{value:02X}, treated as NOP");
                    self.publish_status();
                    value
                }
            },
            PHY_ED_LEVEL => self.apply_command(Command::CcaRequest),
            PHY_CC_CCA if value & PHY_CC_CCA_REQUEST != 0 => {
                let ed = self.apply_command(Command::CcaRequest);
                self.hal.write_data_byte(PHY_ED_LEVEL, ed);
                value & !PHY_CC_CCA_REQUEST
            }
            TRXPR => {
                let previous = self.hal.read_data_byte(TRXPR);
                if value & TRXPR_TRXRST != 0 {
                    self.reset();
                }
                if (previous ^ value) & TRXPR_SLPTR != 0 {
                    self.pin_change_sleep(value & TRXPR_SLPTR != 0);
                }
                value & !TRXPR_TRXRST
            }
            IRQ_STATUS => {
                let status = IrqFlags::from_bits_truncate(self.hal.read_data_byte(IRQ_STATUS));
                status.clear_written(value).bits()
            }
            _ => value,
        };
        self.hal.write_data_byte(addr, latched);
        latched
    }

    /// Read data memory
    pub fn read_register(&self, addr: u16) -> u8 {
        self.hal.read_data_byte(addr)
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Apply a state command
    ///
    /// Returns the byte to latch into `TRX_STATE`: the command code, with
    /// TRAC_STATUS set to INVALID for TX_ARET_ON. A CCA request returns the
    /// energy-detect estimate for `PHY_ED_LEVEL` instead and leaves the mode
    /// alone.
    pub fn apply_command(&mut self, cmd: Command) -> u8 {
        let mut latched = cmd.code().unwrap_or(0);
        log::debug!("Command {cmd:?} in {}", self.mode);

        match cmd {
            Command::CcaRequest => return self.request_cca(),
            Command::Nop => {}
            Command::TxStart => {
                self.mode = RadioMode::BusyTx;
                self.ack_to_send = None;
                self.begin_transmit_role();
            }
            Command::ForceTrxOff | Command::TrxOff => {
                self.mode = RadioMode::TrxOff;
                self.stop_units();
            }
            Command::ForcePllOn | Command::TxOn => {
                self.mode = RadioMode::PllOn;
            }
            Command::RxOn => {
                self.mode = RadioMode::RxOn;
                self.begin_receive_role();
            }
            Command::RxAackOn => {
                self.mode = RadioMode::RxAackOn;
                if self.pending_ack.is_awaiting() {
                    log::debug!("RX_AACK_ON abandons the awaited ACK");
                }
                self.pending_ack = PendingAck::NotRequested;
                self.begin_receive_role();
            }
            Command::TxAretOn => {
                self.mode = RadioMode::BusyTxAret;
                self.ack_to_send = None;
                let xah = self.hal.read_data_byte(XAH_CTRL_0);
                self.frame_retries = (xah & 0xF0) >> 4;
                self.csma_retries = (xah & 0x0E) >> 1;
                log::debug!(
                    "Frame retries {}, CSMA retries {}",
                    self.frame_retries,
                    self.csma_retries
                );
                latched |= TracStatus::Invalid.bits();
                self.begin_transmit_role();
            }
        }

        self.publish_status();
        latched
    }

    /// Stop the receiver if needed and start the transmitter.
    fn begin_transmit_role(&mut self) {
        if self.rx.active {
            self.rx_shutdown();
        }
        if !self.tx.active {
            self.tx_startup();
        }
    }

    /// Stop the transmitter if needed and start the receiver.
    fn begin_receive_role(&mut self) {
        if self.tx.active {
            self.tx_shutdown();
        }
        if !self.rx.active {
            self.rx_startup();
        }
    }

    fn stop_units(&mut self) {
        if self.tx.active {
            self.tx_shutdown();
        }
        if self.rx.active {
            self.rx_shutdown();
        }
    }

    /// Start a CCA / energy detection and return the immediate ED estimate.
    fn request_cca(&mut self) -> u8 {
        let status = self.hal.read_data_byte(TRX_STATUS);
        self.hal
            .write_data_byte(TRX_STATUS, status & !(TRX_STATUS_CCA_DONE | TRX_STATUS_CCA_STATUS));
        self.cca_in_flight = self.cca_in_flight.saturating_add(1);
        self.schedule(RadioEvent::CcaDone);
        (self.hal.read_data_byte(PHY_RSSI) & PHY_RSSI_MASK) * 3
    }

    // ------------------------------------------------------------------
    // Sleep pin and reset
    // ------------------------------------------------------------------

    /// Handle an edge of the SLPTR line
    pub fn pin_change_sleep(&mut self, raised: bool) {
        log::debug!("SLPTR {} in {}", if raised { "raised" } else { "lowered" }, self.mode);

        if raised {
            match self.mode {
                RadioMode::TrxOff => {
                    self.stop_units();
                    self.hal.transition(PowerState::Off);
                    self.mode = RadioMode::Sleep;
                }
                RadioMode::PllOn => {
                    self.mode = RadioMode::BusyTx;
                    self.ack_to_send = None;
                    self.begin_transmit_role();
                }
                RadioMode::BusyTxAret => {}
                other => log::warn!("SLPTR raised in unexpected state {other}"),
            }
        } else {
            match self.mode {
                RadioMode::Sleep => {
                    self.stop_units();
                    self.hal.transition(PowerState::Idle);
                    if self.wake_pending {
                        log::warn!("Wake-up already scheduled");
                    } else {
                        self.wake_pending = true;
                        self.schedule(RadioEvent::WakeUp);
                    }
                }
                other => log::debug!("SLPTR lowered while not sleeping ({other})"),
            }
        }

        self.publish_status();
    }

    /// Return to TRX_OFF with both units stopped and no transaction pending.
    pub fn reset(&mut self) {
        log::debug!("Radio reset");
        self.mode = RadioMode::TrxOff;
        self.pending_ack = PendingAck::NotRequested;
        self.ack_to_send = None;
        self.last_crc_ok = false;
        self.cca_in_flight = 0;
        self.wake_pending = false;
        self.stop_units();
        self.tx.state = TxState::Wait;
        self.rx.state = RxState::SfdScan;
        self.publish_status();
    }

    // ------------------------------------------------------------------
    // Timed events
    // ------------------------------------------------------------------

    fn schedule(&mut self, event: RadioEvent) {
        let delay = event.delay_cycles(self.cycles_per_byte);
        log::debug!("Scheduling {} in {delay} cycles", event.name());
        self.hal.schedule(event, delay);
    }

    /// Deliver a timed event previously handed to the scheduler
    ///
    /// Events that no longer apply (reset in between, ACK already resolved,
    /// newer transmission) are ignored.
    pub fn fire(&mut self, event: RadioEvent) {
        match event {
            RadioEvent::CcaDone => self.cca_done(),
            RadioEvent::WakeUp => self.wake_up(),
            RadioEvent::AckTimeout { epoch } => self.ack_timeout(epoch),
        }
    }

    fn cca_done(&mut self) {
        if self.cca_in_flight == 0 {
            log::debug!("Stale CCA completion ignored");
            return;
        }
        self.cca_in_flight -= 1;

        let rssi = self.hal.read_data_byte(PHY_RSSI) & PHY_RSSI_MASK;
        let threshold = (self.hal.read_data_byte(CCA_THRES) & CCA_THRES_ED_MASK) << 1;
        let busy = rssi > threshold;

        let low = self.hal.read_data_byte(TRX_STATUS) & !(TRX_STATUS_CCA_DONE | TRX_STATUS_CCA_STATUS);
        let flags = if busy {
            TRX_STATUS_CCA_DONE
        } else {
            TRX_STATUS_CCA_DONE | TRX_STATUS_CCA_STATUS
        };
        self.hal.write_data_byte(TRX_STATUS, flags | low);
        log::debug!("CCA done: rssi {rssi}, threshold {threshold}, busy {busy}");
        self.raise(InterruptVector::CcaEdDone);
    }

    fn wake_up(&mut self) {
        if !self.wake_pending {
            log::debug!("Stale wake-up ignored");
            return;
        }
        self.wake_pending = false;
        self.mode = RadioMode::TrxOff;
        self.publish_status();
        self.raise(InterruptVector::Awake);
    }

    fn ack_timeout(&mut self, epoch: u32) {
        if !self.pending_ack.is_awaiting() || epoch != self.ack_epoch {
            return;
        }
        log::info!("No ACK received, transaction failed");
        self.pending_ack = PendingAck::Failed;
        self.hal.write_data_byte(TRX_STATE, TracStatus::NoAck.bits());
        self.mode = RadioMode::TxAretOn;
        self.publish_status();
        self.tx.state = TxState::Wait;
        if self.rx.active {
            self.rx_shutdown();
        } else {
            log::warn!("Receiver not active at ACK timeout");
        }
        self.raise(InterruptVector::TxEnd);
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    /// Write the mode to `TRX_STATUS`, clearing the CCA flags.
    fn publish_status(&mut self) {
        self.hal.write_data_byte(TRX_STATUS, self.mode.status_code());
    }

    /// Write the mode to `TRX_STATUS[4:0]`, keeping the upper flag bits.
    fn publish_status_preserving(&mut self) {
        let flags = self.hal.read_data_byte(TRX_STATUS) & TRX_STATUS_FLAGS_MASK;
        self.hal
            .write_data_byte(TRX_STATUS, self.mode.status_code() | flags);
    }

    /// Latch the flag in `IRQ_STATUS` and post the vector.
    fn raise(&mut self, vector: InterruptVector) {
        let status = self.hal.read_data_byte(IRQ_STATUS) | IrqFlags::from(vector).bits();
        self.hal.write_data_byte(IRQ_STATUS, status);
        log::debug!("{} interrupt", vector.name());
        self.hal.post_interrupt(vector);
    }
}
