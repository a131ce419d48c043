//! Data memory backing the transceiver registers

use crate::constants::{REGISTER_SPACE_END, TRXPR};
use crate::error::RadioError;

/// Flat byte-addressed memory covering the I/O space up to the end of the
/// frame buffer
#[derive(Debug, Clone)]
pub struct RegisterMemory {
    bytes: Vec<u8>,
}

impl Default for RegisterMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterMemory {
    pub fn new() -> Self {
        Self {
            bytes: vec![0; REGISTER_SPACE_END as usize],
        }
    }

    /// Reads outside the memory return 0.
    pub fn read(&self, addr: u16) -> u8 {
        self.bytes.get(addr as usize).copied().unwrap_or(0)
    }

    /// Writes outside the memory are dropped.
    pub fn write(&mut self, addr: u16, value: u8) {
        match self.bytes.get_mut(addr as usize) {
            Some(slot) => *slot = value,
            None => log::warn!("Write to 0x{addr:03X} outside data memory dropped"),
        }
    }

    /// Copy `data` into memory starting at `base`
    pub fn write_block(&mut self, base: u16, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.write(base + i as u16, byte);
        }
    }

    /// Copy `len` bytes starting at `base`
    pub fn read_block(&self, base: u16, len: usize) -> Vec<u8> {
        (0..len).map(|i| self.read(base + i as u16)).collect()
    }

    /// Reject addresses outside the transceiver window (`TRXPR` up to the
    /// end of the frame buffer)
    pub fn check_register(addr: u16) -> Result<(), RadioError> {
        if (TRXPR..REGISTER_SPACE_END).contains(&addr) {
            Ok(())
        } else {
            Err(RadioError::RegisterOutOfRange(addr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{TRXFBST, TRX_STATUS};

    #[test]
    fn test_read_write() {
        let mut mem = RegisterMemory::new();
        mem.write(TRX_STATUS, 0x08);
        assert_eq!(mem.read(TRX_STATUS), 0x08);
        mem.write_block(TRXFBST, &[1, 2, 3]);
        assert_eq!(mem.read_block(TRXFBST, 4), vec![1, 2, 3, 0]);
    }

    #[test]
    fn test_out_of_range_is_harmless() {
        let mut mem = RegisterMemory::new();
        mem.write(0xFFFF, 1);
        assert_eq!(mem.read(0xFFFF), 0);
    }

    #[test]
    fn test_register_window() {
        assert!(RegisterMemory::check_register(TRXPR).is_ok());
        assert!(RegisterMemory::check_register(TRXFBST + 127).is_ok());
        assert!(matches!(
            RegisterMemory::check_register(TRXFBST + 128),
            Err(RadioError::RegisterOutOfRange(0x200))
        ));
        assert!(RegisterMemory::check_register(0x20).is_err());
    }
}
