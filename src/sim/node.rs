//! Per-radio host services
//!
//! [`NodeHal`] implements every [`Hal`](crate::radio::Hal) trait by
//! recording. Interrupts, power transitions and medium requests are logged
//! with the cycle they happened at; scheduled events collect in `outbox`
//! until the owner (a test or the [`Network`](super::network::Network))
//! picks them up.

use super::memory::RegisterMemory;
use crate::constants::TRXFBST;
use crate::radio::{
    InterruptSink, InterruptVector, Medium, PowerObserver, PowerState, RadioEvent, RegisterFile,
    Scheduler,
};

/// A transmission registered with the medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxRegistration {
    pub power_dbm: f64,
    pub frequency_mhz: f64,
    pub lead_cycles: u64,
    /// Cycle at which the first preamble byte is due
    pub first_byte_at: u64,
}

/// What the radio currently has registered with the medium
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MediumState {
    pub transmitting: Option<TxRegistration>,
    /// Receive frequency in MHz
    pub receiving: Option<f64>,
}

/// A call the radio made on the medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediumRequest {
    BeginTransmit {
        power_dbm: f64,
        frequency_mhz: f64,
        lead_cycles: u64,
    },
    EndTransmit,
    BeginReceive {
        frequency_mhz: f64,
    },
    EndReceive,
}

/// Recording host for one radio
#[derive(Debug, Clone, Default)]
pub struct NodeHal {
    pub registers: RegisterMemory,
    /// Current cycle, maintained by the owner
    pub now: u64,
    pub interrupts: Vec<(u64, InterruptVector)>,
    /// Scheduled events with their delay in cycles
    pub outbox: Vec<(RadioEvent, u64)>,
    pub medium: MediumState,
    pub medium_log: Vec<(u64, MediumRequest)>,
    pub power_log: Vec<(u64, PowerState)>,
}

impl NodeHal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posted vectors in order, without timestamps
    pub fn interrupt_vectors(&self) -> Vec<InterruptVector> {
        self.interrupts.iter().map(|&(_, v)| v).collect()
    }

    /// How many times `vector` was posted
    pub fn interrupt_count(&self, vector: InterruptVector) -> usize {
        self.interrupts.iter().filter(|&&(_, v)| v == vector).count()
    }

    /// Place a PSDU (without FCS) in the frame buffer the way firmware does:
    /// PHY length first, counting the two FCS octets.
    pub fn load_frame(&mut self, psdu: &[u8]) {
        let length = (psdu.len() + 2).min(u8::MAX as usize) as u8;
        self.registers.write(TRXFBST, length);
        self.registers.write_block(TRXFBST + 1, psdu);
    }

    /// Hand over the scheduled events collected so far
    pub fn take_outbox(&mut self) -> Vec<(RadioEvent, u64)> {
        std::mem::take(&mut self.outbox)
    }
}

impl RegisterFile for NodeHal {
    fn read_data_byte(&self, addr: u16) -> u8 {
        self.registers.read(addr)
    }

    fn write_data_byte(&mut self, addr: u16, value: u8) {
        self.registers.write(addr, value);
    }
}

impl InterruptSink for NodeHal {
    fn post_interrupt(&mut self, vector: InterruptVector) {
        self.interrupts.push((self.now, vector));
    }
}

impl Medium for NodeHal {
    fn begin_transmit(&mut self, power_dbm: f64, frequency_mhz: f64, lead_cycles: u64) {
        self.medium.transmitting = Some(TxRegistration {
            power_dbm,
            frequency_mhz,
            lead_cycles,
            first_byte_at: self.now + lead_cycles,
        });
        self.medium_log.push((
            self.now,
            MediumRequest::BeginTransmit {
                power_dbm,
                frequency_mhz,
                lead_cycles,
            },
        ));
    }

    fn end_transmit(&mut self) {
        self.medium.transmitting = None;
        self.medium_log.push((self.now, MediumRequest::EndTransmit));
    }

    fn begin_receive(&mut self, frequency_mhz: f64) {
        self.medium.receiving = Some(frequency_mhz);
        self.medium_log
            .push((self.now, MediumRequest::BeginReceive { frequency_mhz }));
    }

    fn end_receive(&mut self) {
        self.medium.receiving = None;
        self.medium_log.push((self.now, MediumRequest::EndReceive));
    }
}

impl Scheduler for NodeHal {
    fn schedule(&mut self, event: RadioEvent, delay_cycles: u64) {
        self.outbox.push((event, delay_cycles));
    }
}

impl PowerObserver for NodeHal {
    fn transition(&mut self, state: PowerState) {
        self.power_log.push((self.now, state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_frame_layout() {
        let mut hal = NodeHal::new();
        hal.load_frame(&[0x41, 0x88, 0x07]);
        assert_eq!(hal.registers.read_block(TRXFBST, 4), vec![5, 0x41, 0x88, 0x07]);
    }

    #[test]
    fn test_records_with_timestamps() {
        let mut hal = NodeHal::new();
        hal.now = 1000;
        hal.begin_transmit(0.0, 2405.0, 64);
        hal.post_interrupt(InterruptVector::TxEnd);
        hal.transition(PowerState::Idle);
        hal.end_transmit();

        assert_eq!(hal.medium.transmitting, None);
        assert_eq!(hal.medium_log.len(), 2);
        assert_eq!(hal.interrupts, vec![(1000, InterruptVector::TxEnd)]);
        assert_eq!(hal.power_log, vec![(1000, PowerState::Idle)]);
        assert_eq!(hal.interrupt_count(InterruptVector::TxEnd), 1);
    }

    #[test]
    fn test_first_byte_time() {
        let mut hal = NodeHal::new();
        hal.now = 500;
        hal.begin_transmit(3.5, 2480.0, 4032);
        let tx = hal.medium.transmitting.unwrap();
        assert_eq!(tx.first_byte_at, 4532);
    }

    #[test]
    fn test_take_outbox_drains() {
        let mut hal = NodeHal::new();
        hal.schedule(RadioEvent::WakeUp, 10);
        assert_eq!(hal.take_outbox(), vec![(RadioEvent::WakeUp, 10)]);
        assert!(hal.outbox.is_empty());
    }
}
