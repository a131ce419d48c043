//! # Transceiver Interrupt Handling
//!
//! The ATmega128RFA1 transceiver raises its events on dedicated MCU interrupt
//! vectors and mirrors each one as a flag in `IRQ_STATUS`. Firmware clears a
//! flag by writing a one to it.
//!
//! ## Bit Assignments
//!
//! ```text
//! Bit 7: AWAKE       - Transceiver woke up from SLEEP
//! Bit 6: TX_END      - Frame transmission (or ARET transaction) finished
//! Bit 5: AMI         - Address match
//! Bit 4: CCA_ED_DONE - CCA or energy detection finished
//! Bit 3: RX_END      - Frame reception finished
//! Bit 2: RX_START    - Frame reception started
//! Bit 1: PLL_UNLOCK  - PLL or channel lock lost
//! Bit 0: PLL_LOCK    - PLL locked
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rfa1_radio::radio::irq::{InterruptVector, IrqFlags};
//!
//! let status = IrqFlags::from(InterruptVector::RxEnd) | IrqFlags::TX_END;
//! assert!(status.contains(IrqFlags::RX_END));
//! assert_eq!(status.bits(), 0x48);
//! ```

use bitflags::bitflags;

/// MCU interrupt vectors used by the transceiver
///
/// The discriminant is the vector number posted to the interrupt controller.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InterruptVector {
    /// TRX24_PLL_LOCK
    PllLock = 57,
    /// TRX24_PLL_UNLOCK, also raised when the channel lock is lost mid-frame
    PllUnlock = 58,
    /// TRX24_RX_START
    RxStart = 60,
    /// TRX24_RX_END
    RxEnd = 61,
    /// TRX24_CCA_ED_DONE
    CcaEdDone = 62,
    /// TRX24_XAH_AMI
    AddressMatch = 63,
    /// TRX24_TX_END
    TxEnd = 64,
    /// TRX24_AWAKE
    Awake = 65,
}

impl InterruptVector {
    /// Vector number as seen by the interrupt controller
    pub const fn number(self) -> u8 {
        self as u8
    }

    /// Datasheet name of the vector
    pub fn name(self) -> &'static str {
        match self {
            InterruptVector::PllLock => "TRX24_PLL_LOCK",
            InterruptVector::PllUnlock => "TRX24_PLL_UNLOCK",
            InterruptVector::RxStart => "TRX24_RX_START",
            InterruptVector::RxEnd => "TRX24_RX_END",
            InterruptVector::CcaEdDone => "TRX24_CCA_ED_DONE",
            InterruptVector::AddressMatch => "TRX24_XAH_AMI",
            InterruptVector::TxEnd => "TRX24_TX_END",
            InterruptVector::Awake => "TRX24_AWAKE",
        }
    }
}

bitflags! {
    /// Flags of the `IRQ_STATUS` (and `IRQ_MASK`) register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IrqFlags: u8 {
        const PLL_LOCK = 1 << 0;
        const PLL_UNLOCK = 1 << 1;
        const RX_START = 1 << 2;
        const RX_END = 1 << 3;
        const CCA_ED_DONE = 1 << 4;
        const AMI = 1 << 5;
        const TX_END = 1 << 6;
        const AWAKE = 1 << 7;
    }
}

impl From<InterruptVector> for IrqFlags {
    fn from(vector: InterruptVector) -> Self {
        match vector {
            InterruptVector::PllLock => IrqFlags::PLL_LOCK,
            InterruptVector::PllUnlock => IrqFlags::PLL_UNLOCK,
            InterruptVector::RxStart => IrqFlags::RX_START,
            InterruptVector::RxEnd => IrqFlags::RX_END,
            InterruptVector::CcaEdDone => IrqFlags::CCA_ED_DONE,
            InterruptVector::AddressMatch => IrqFlags::AMI,
            InterruptVector::TxEnd => IrqFlags::TX_END,
            InterruptVector::Awake => IrqFlags::AWAKE,
        }
    }
}

impl IrqFlags {
    /// Apply a firmware write to `IRQ_STATUS`: ones clear, zeros keep.
    pub fn clear_written(self, written: u8) -> Self {
        self.difference(IrqFlags::from_bits_truncate(written))
    }

    pub fn rx_end(&self) -> bool {
        self.contains(IrqFlags::RX_END)
    }

    pub fn tx_end(&self) -> bool {
        self.contains(IrqFlags::TX_END)
    }

    pub fn awake(&self) -> bool {
        self.contains(IrqFlags::AWAKE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_numbers() {
        assert_eq!(InterruptVector::PllUnlock.number(), 58);
        assert_eq!(InterruptVector::RxStart.number(), 60);
        assert_eq!(InterruptVector::RxEnd.number(), 61);
        assert_eq!(InterruptVector::CcaEdDone.number(), 62);
        assert_eq!(InterruptVector::TxEnd.number(), 64);
        assert_eq!(InterruptVector::Awake.number(), 65);
    }

    #[test]
    fn test_each_vector_maps_to_one_flag() {
        let vectors = [
            InterruptVector::PllLock,
            InterruptVector::PllUnlock,
            InterruptVector::RxStart,
            InterruptVector::RxEnd,
            InterruptVector::CcaEdDone,
            InterruptVector::AddressMatch,
            InterruptVector::TxEnd,
            InterruptVector::Awake,
        ];
        let mut all = IrqFlags::empty();
        for v in vectors {
            let flag = IrqFlags::from(v);
            assert_eq!(flag.bits().count_ones(), 1, "{}", v.name());
            assert!(!all.intersects(flag));
            all |= flag;
        }
        assert_eq!(all, IrqFlags::all());
    }

    #[test]
    fn test_write_one_to_clear() {
        let status = IrqFlags::RX_START | IrqFlags::RX_END | IrqFlags::TX_END;
        let cleared = status.clear_written(IrqFlags::RX_START.bits());
        assert_eq!(cleared, IrqFlags::RX_END | IrqFlags::TX_END);
        assert!(cleared.rx_end());
        assert!(cleared.tx_end());
        assert!(!cleared.awake());
        assert_eq!(status.clear_written(0xFF), IrqFlags::empty());
        assert_eq!(status.clear_written(0x00), status);
    }
}
