//! # Hardware Abstraction Layer for the Simulated Transceiver
//!
//! The radio model does not own memory, time, interrupts or the channel. It
//! talks to the surrounding simulator through the traits below, bundled into
//! [`Hal`]. Any type implementing all five gets `Hal` for free.
//!
//! None of the calls can fail: the simulator is the hardware.

use super::events::RadioEvent;
use super::irq::InterruptVector;
use super::power::PowerState;

/// Data memory holding the transceiver registers and the frame buffer
pub trait RegisterFile {
    /// Read a byte of data memory
    fn read_data_byte(&self, addr: u16) -> u8;

    /// Store a byte of data memory without triggering register side effects
    fn write_data_byte(&mut self, addr: u16, value: u8);
}

/// Interrupt controller of the MCU
pub trait InterruptSink {
    /// Assert an interrupt vector
    fn post_interrupt(&mut self, vector: InterruptVector);
}

/// Shared radio channel
///
/// While a transmission is registered, the medium pulls one byte per
/// byte-time from [`Radio::tx_next_byte`](super::Radio::tx_next_byte),
/// starting `lead_cycles` after `begin_transmit`. While a reception is
/// registered, it pushes one byte per byte-time into
/// [`Radio::rx_next_byte`](super::Radio::rx_next_byte).
pub trait Medium {
    fn begin_transmit(&mut self, power_dbm: f64, frequency_mhz: f64, lead_cycles: u64);
    fn end_transmit(&mut self);
    fn begin_receive(&mut self, frequency_mhz: f64);
    fn end_receive(&mut self);
}

/// Discrete-event clock
pub trait Scheduler {
    /// Fire `event` after `delay_cycles` MCU cycles. Events due at the same
    /// cycle fire in insertion order.
    fn schedule(&mut self, event: RadioEvent, delay_cycles: u64);
}

/// Energy accounting side channel
pub trait PowerObserver {
    fn transition(&mut self, state: PowerState);
}

/// Everything the radio needs from its host
pub trait Hal: RegisterFile + InterruptSink + Medium + Scheduler + PowerObserver {}

impl<T> Hal for T where T: RegisterFile + InterruptSink + Medium + Scheduler + PowerObserver {}
