//! # Radio Operating States and Commands
//!
//! Encodings of the transceiver's top-level status (`TRX_STATUS[4:0]`), the
//! commands accepted through `TRX_STATE[4:0]`, and the transaction outcome
//! reported in `TRX_STATE[7:5]` (TRAC_STATUS) in extended operating mode.
//!
//! ## State Overview
//!
//! ```text
//!            SLPTR high                TX_START / SLPTR high
//!   SLEEP <------------- TRX_OFF       PLL_ON ---------------> BUSY_TX
//!     |                   ^  |           ^                        |
//!     +-- SLPTR low ------+  |           +------- frame sent -----+
//!        (AWAKE after        |
//!         384 us)            +-- RX_ON --> RX_ON <--> BUSY_RX
//!
//!   RX_AACK_ON <--> BUSY_RX_AACK          TX_ARET_ON <--> BUSY_TX_ARET
//! ```

/// Radio operating modes as reported in `TRX_STATUS[4:0]`
///
/// The discriminant is the status code written to the register.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioMode {
    /// Receiving a frame in basic mode
    BusyRx = 0x01,
    /// Transmitting a frame in basic mode
    BusyTx = 0x02,
    /// Listening in basic mode
    RxOn = 0x06,
    /// Transceiver off, clock running (the "OFF" mode)
    TrxOff = 0x08,
    /// PLL locked, ready to transmit
    PllOn = 0x09,
    /// Transceiver asleep, oscillator stopped
    Sleep = 0x0F,
    /// Receiving a frame with automatic acknowledgment
    BusyRxAack = 0x11,
    /// Transmitting (and awaiting the ACK) in extended mode
    BusyTxAret = 0x12,
    /// Listening with automatic acknowledgment
    RxAackOn = 0x16,
    /// Extended transmit mode, idle
    TxAretOn = 0x19,
    /// State transition in progress
    StateTransition = 0x1F,
}

impl RadioMode {
    /// Status code for `TRX_STATUS[4:0]`
    pub const fn status_code(self) -> u8 {
        self as u8
    }

    /// Decode a `TRX_STATUS` value; the CCA flag bits are ignored.
    pub fn from_status(status: u8) -> Option<Self> {
        match status & 0x1F {
            0x01 => Some(RadioMode::BusyRx),
            0x02 => Some(RadioMode::BusyTx),
            0x06 => Some(RadioMode::RxOn),
            0x08 => Some(RadioMode::TrxOff),
            0x09 => Some(RadioMode::PllOn),
            0x0F => Some(RadioMode::Sleep),
            0x11 => Some(RadioMode::BusyRxAack),
            0x12 => Some(RadioMode::BusyTxAret),
            0x16 => Some(RadioMode::RxAackOn),
            0x19 => Some(RadioMode::TxAretOn),
            0x1F => Some(RadioMode::StateTransition),
            _ => None,
        }
    }

    /// Listening modes in which an SFD starts a reception
    pub fn is_listening(self) -> bool {
        matches!(self, RadioMode::RxOn | RadioMode::RxAackOn)
    }

    /// Busy variant entered when a frame starts arriving, if any
    pub fn busy_receive_variant(self) -> Option<Self> {
        match self {
            RadioMode::RxAackOn => Some(RadioMode::BusyRxAack),
            RadioMode::RxOn => Some(RadioMode::BusyRx),
            _ => None,
        }
    }
}

impl std::fmt::Display for RadioMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RadioMode::BusyRx => "BUSY_RX",
            RadioMode::BusyTx => "BUSY_TX",
            RadioMode::RxOn => "RX_ON",
            RadioMode::TrxOff => "TRX_OFF",
            RadioMode::PllOn => "PLL_ON",
            RadioMode::Sleep => "SLEEP",
            RadioMode::BusyRxAack => "BUSY_RX_AACK",
            RadioMode::BusyTxAret => "BUSY_TX_ARET",
            RadioMode::RxAackOn => "RX_AACK_ON",
            RadioMode::TxAretOn => "TX_ARET_ON",
            RadioMode::StateTransition => "STATE_TRANSITION_IN_PROGRESS",
        };
        f.write_str(name)
    }
}

/// Commands accepted by the radio controller
///
/// All but `CcaRequest` are written to `TRX_STATE[4:0]`. A CCA request is
/// triggered by a write to `PHY_ED_LEVEL` or by setting `PHY_CC_CCA[7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Nop,
    TxStart,
    ForceTrxOff,
    ForcePllOn,
    RxOn,
    TrxOff,
    TxOn,
    RxAackOn,
    TxAretOn,
    CcaRequest,
}

impl Command {
    /// Every command, in register code order, followed by the CCA request
    pub const ALL: [Command; 10] = [
        Command::Nop,
        Command::TxStart,
        Command::ForceTrxOff,
        Command::ForcePllOn,
        Command::RxOn,
        Command::TrxOff,
        Command::TxOn,
        Command::RxAackOn,
        Command::TxAretOn,
        Command::CcaRequest,
    ];

    /// Decode `TRX_STATE[4:0]`; undefined codes yield `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code & 0x1F {
            0x00 => Some(Command::Nop),
            0x02 => Some(Command::TxStart),
            0x03 => Some(Command::ForceTrxOff),
            0x04 => Some(Command::ForcePllOn),
            0x06 => Some(Command::RxOn),
            0x08 => Some(Command::TrxOff),
            0x09 => Some(Command::TxOn),
            0x16 => Some(Command::RxAackOn),
            0x19 => Some(Command::TxAretOn),
            _ => None,
        }
    }

    /// Register code, or `None` for the CCA request
    pub fn code(self) -> Option<u8> {
        match self {
            Command::Nop => Some(0x00),
            Command::TxStart => Some(0x02),
            Command::ForceTrxOff => Some(0x03),
            Command::ForcePllOn => Some(0x04),
            Command::RxOn => Some(0x06),
            Command::TrxOff => Some(0x08),
            Command::TxOn => Some(0x09),
            Command::RxAackOn => Some(0x16),
            Command::TxAretOn => Some(0x19),
            Command::CcaRequest => None,
        }
    }

    /// Parse the datasheet name of a command (`"TX_ARET_ON"`, `"cca_request"`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "NOP" => Some(Command::Nop),
            "TX_START" => Some(Command::TxStart),
            "FORCE_TRX_OFF" | "FORCE_OFF" => Some(Command::ForceTrxOff),
            "FORCE_PLL_ON" => Some(Command::ForcePllOn),
            "RX_ON" => Some(Command::RxOn),
            "TRX_OFF" => Some(Command::TrxOff),
            "TX_ON" | "PLL_ON" => Some(Command::TxOn),
            "RX_AACK_ON" => Some(Command::RxAackOn),
            "TX_ARET_ON" => Some(Command::TxAretOn),
            "CCA_REQUEST" | "CCA" => Some(Command::CcaRequest),
            _ => None,
        }
    }
}

/// Acknowledgment bookkeeping for extended-mode transmissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingAck {
    /// No acknowledged transmission in progress
    #[default]
    NotRequested,
    /// Frame sent, receiver listening for the ACK
    Awaiting,
    /// ACK frame received in time
    Succeeded,
    /// ACK timed out or a non-ACK frame arrived instead
    Failed,
}

impl PendingAck {
    pub fn is_awaiting(self) -> bool {
        self == PendingAck::Awaiting
    }
}

/// Transaction outcome reported in `TRX_STATE[7:5]`
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracStatus {
    Success = 0,
    SuccessDataPending = 1,
    SuccessWaitForAck = 2,
    ChannelAccessFailure = 3,
    NoAck = 5,
    Invalid = 7,
}

impl TracStatus {
    /// Value of the TRAC_STATUS field in position (`TRX_STATE[7:5]`)
    pub const fn bits(self) -> u8 {
        (self as u8) << 5
    }

    /// Decode `TRX_STATE[7:5]`
    pub fn from_register(trx_state: u8) -> Option<Self> {
        match trx_state >> 5 {
            0 => Some(TracStatus::Success),
            1 => Some(TracStatus::SuccessDataPending),
            2 => Some(TracStatus::SuccessWaitForAck),
            3 => Some(TracStatus::ChannelAccessFailure),
            5 => Some(TracStatus::NoAck),
            7 => Some(TracStatus::Invalid),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip() {
        let modes = [
            RadioMode::BusyRx,
            RadioMode::BusyTx,
            RadioMode::RxOn,
            RadioMode::TrxOff,
            RadioMode::PllOn,
            RadioMode::Sleep,
            RadioMode::BusyRxAack,
            RadioMode::BusyTxAret,
            RadioMode::RxAackOn,
            RadioMode::TxAretOn,
            RadioMode::StateTransition,
        ];
        for mode in modes {
            assert_eq!(RadioMode::from_status(mode.status_code()), Some(mode));
            // CCA_DONE/CCA_STATUS bits do not change the decoded mode
            assert_eq!(RadioMode::from_status(mode.status_code() | 0xC0), Some(mode));
        }
        assert_eq!(RadioMode::from_status(0x07), None);
    }

    #[test]
    fn test_busy_receive_variant() {
        assert_eq!(RadioMode::RxAackOn.busy_receive_variant(), Some(RadioMode::BusyRxAack));
        assert_eq!(RadioMode::RxOn.busy_receive_variant(), Some(RadioMode::BusyRx));
        assert_eq!(RadioMode::TxAretOn.busy_receive_variant(), None);
        assert!(RadioMode::RxOn.is_listening());
        assert!(!RadioMode::BusyRxAack.is_listening());
    }

    #[test]
    fn test_command_codes() {
        for cmd in Command::ALL {
            match cmd.code() {
                Some(code) => assert_eq!(Command::from_code(code), Some(cmd)),
                None => assert_eq!(cmd, Command::CcaRequest),
            }
        }
        assert_eq!(Command::from_code(0x01), None);
        assert_eq!(Command::from_code(0x1F), None);
        // Upper TRAC bits are not part of the command
        assert_eq!(Command::from_code(0xE2), Some(Command::TxStart));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::from_name("tx_aret_on"), Some(Command::TxAretOn));
        assert_eq!(Command::from_name("FORCE_TRX_OFF"), Some(Command::ForceTrxOff));
        assert_eq!(Command::from_name("cca"), Some(Command::CcaRequest));
        assert_eq!(Command::from_name("BOGUS"), None);
    }

    #[test]
    fn test_trac_status_bits() {
        assert_eq!(TracStatus::Success.bits(), 0x00);
        assert_eq!(TracStatus::NoAck.bits(), 0xA0);
        assert_eq!(TracStatus::Invalid.bits(), 0xE0);
        assert_eq!(TracStatus::from_register(0xA0), Some(TracStatus::NoAck));
        assert_eq!(TracStatus::from_register(0xF9), Some(TracStatus::Invalid));
        assert_eq!(TracStatus::from_register(0x80), None);
    }

    #[test]
    fn test_pending_ack_predicates() {
        assert!(PendingAck::Awaiting.is_awaiting());
        assert!(!PendingAck::Failed.is_awaiting());
        assert_eq!(PendingAck::default(), PendingAck::NotRequested);
    }
}
