#![no_main]

use libfuzzer_sys::fuzz_target;
use rfa1_radio::{Command, NodeHal, Radio, RadioConfig};

fuzz_target!(|data: &[u8]| {
    let Some((&mode, air)) = data.split_first() else {
        return;
    };

    let mut radio = Radio::new(NodeHal::new(), RadioConfig::default());
    radio.apply_command(if mode & 1 == 0 {
        Command::RxOn
    } else {
        Command::RxAackOn
    });

    // Every 16th byte drops the lock so recovery paths get exercised too
    for (i, &byte) in air.iter().enumerate() {
        let locked = mode & 0x80 == 0 || i % 16 != 15;
        radio.rx_next_byte(locked, byte);
        if !radio.is_receiving() {
            // An automatic ACK took over; drain it
            while radio.is_transmitting() {
                radio.tx_next_byte();
            }
            radio.apply_command(Command::RxAackOn);
        }
    }
});
