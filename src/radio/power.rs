//! Power states reported to the energy observer.
//!
//! The observer receives an index into an energy model's mode table. Index
//! layout: 0 off, 1 idle, 3 receive, 6..=21 transmit (highest output power at
//! the highest index).

use crate::constants::PHY_TX_PWR_MASK;

/// Output power in dBm for each `PHY_TX_PWR[3:0]` setting
pub const TX_POWER_DBM: [f64; 16] = [
    3.0, 2.8, 2.3, 1.8, 1.3, 0.7, 0.0, -1.0, -2.0, -3.0, -4.0, -5.0, -7.0, -9.0, -12.0, -17.0,
];

/// Power state of the transceiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    /// Sleeping, oscillator off
    Off,
    /// Awake with neither unit running
    Idle,
    /// Receiver running (also entered when the transmitter stops)
    Receive,
    /// Transmitter running at the given `PHY_TX_PWR[3:0]` setting
    Transmit { power_setting: u8 },
}

impl PowerState {
    /// Transmit state for a raw `PHY_TX_PWR` register value
    pub fn transmit(phy_tx_pwr: u8) -> Self {
        PowerState::Transmit {
            power_setting: phy_tx_pwr & PHY_TX_PWR_MASK,
        }
    }

    /// Index into the energy model's mode table
    pub fn index(self) -> u8 {
        match self {
            PowerState::Off => 0,
            PowerState::Idle => 1,
            PowerState::Receive => 3,
            PowerState::Transmit { power_setting } => 6 + 15 - (power_setting & PHY_TX_PWR_MASK),
        }
    }
}

/// Output power in dBm for a raw `PHY_TX_PWR` register value
pub fn tx_power_dbm(phy_tx_pwr: u8) -> f64 {
    TX_POWER_DBM[(phy_tx_pwr & PHY_TX_PWR_MASK) as usize]
}
