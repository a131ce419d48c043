//! Timed events
//!
//! Delayed effects are plain data handed to the scheduler. When an event
//! fires the scheduler passes it back to [`Radio::fire`](super::Radio::fire),
//! which re-checks whether it still applies. Events are never cancelled.

use crate::constants::{ACK_TIMEOUT_BYTES, CCA_DELAY_DEN, CCA_DELAY_NUM, WAKEUP_DELAY_BYTES};

/// A delayed radio callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RadioEvent {
    /// CCA / energy detection measurement finished (140 us)
    CcaDone,
    /// Oscillator settled after leaving SLEEP (384 us)
    WakeUp,
    /// No ACK arrived for the transmission tagged `epoch` (27 byte-times)
    AckTimeout { epoch: u32 },
}

impl RadioEvent {
    /// Delay between scheduling and firing, in MCU cycles
    pub fn delay_cycles(&self, cycles_per_byte: u64) -> u64 {
        match self {
            RadioEvent::CcaDone => CCA_DELAY_NUM * cycles_per_byte / CCA_DELAY_DEN,
            RadioEvent::WakeUp => WAKEUP_DELAY_BYTES * cycles_per_byte,
            RadioEvent::AckTimeout { .. } => ACK_TIMEOUT_BYTES * cycles_per_byte,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RadioEvent::CcaDone => "cca-done",
            RadioEvent::WakeUp => "wake-up",
            RadioEvent::AckTimeout { .. } => "ack-timeout",
        }
    }
}
