//! Radio timing configuration
//!
//! Everything the radio needs to turn byte-times and microseconds into MCU
//! clock cycles, plus the seed of the link-quality generator.

use crate::constants::{DEFAULT_BIT_RATE, DEFAULT_CLOCK_HZ, DEFAULT_LEAD_BITS};
use crate::error::RadioError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Timing configuration of a simulated radio
///
/// # Examples
///
/// ```rust
/// use rfa1_radio::radio::config::RadioConfig;
///
/// let config = RadioConfig::default();
/// assert_eq!(config.cycles_per_byte(), 512);
/// assert_eq!(config.us_to_cycles(384), 6144);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioConfig {
    /// MCU crystal frequency in Hz
    pub clock_hz: u32,

    /// Air bit rate in bit/s (250 kbit/s for O-QPSK at 2.4 GHz)
    pub bit_rate: u32,

    /// PLL lock lead time before the first transmitted byte, in bit-times
    pub lead_bits: u32,

    /// Seed of the link-quality generator
    pub seed: u64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            bit_rate: DEFAULT_BIT_RATE,
            lead_bits: DEFAULT_LEAD_BITS,
            seed: 0,
        }
    }
}

impl RadioConfig {
    /// Load and validate a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RadioError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: RadioConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the clock can resolve at least one cycle per bit.
    pub fn validate(&self) -> Result<(), RadioError> {
        if self.clock_hz == 0 {
            return Err(RadioError::InvalidConfig("clock_hz must be nonzero".into()));
        }
        if self.bit_rate == 0 {
            return Err(RadioError::InvalidConfig("bit_rate must be nonzero".into()));
        }
        if self.clock_hz < self.bit_rate {
            return Err(RadioError::InvalidConfig(format!(
                "clock_hz ({}) must not be below bit_rate ({})",
                self.clock_hz, self.bit_rate
            )));
        }
        Ok(())
    }

    /// MCU cycles per transmitted bit
    pub fn cycles_per_bit(&self) -> u64 {
        self.clock_hz as u64 / self.bit_rate.max(1) as u64
    }

    /// MCU cycles per transmitted byte, the radio's tick
    pub fn cycles_per_byte(&self) -> u64 {
        self.clock_hz as u64 * 8 / self.bit_rate.max(1) as u64
    }

    /// Lead time before the first preamble byte, in cycles
    ///
    /// Higher output power settings (lower `PHY_TX_PWR[3:0]`) add up to 15
    /// bit-times of extra PA ramp-up.
    pub fn lead_cycles(&self, phy_tx_pwr: u8) -> u64 {
        let ramp_bits = 15 - (phy_tx_pwr & 0x0F) as u64;
        (self.lead_bits as u64 + ramp_bits) * self.cycles_per_bit()
    }

    pub fn us_to_cycles(&self, us: u64) -> u64 {
        us * self.clock_hz as u64 / 1_000_000
    }

    pub fn cycles_to_us(&self, cycles: u64) -> f64 {
        cycles as f64 * 1_000_000.0 / self.clock_hz as f64
    }
}
