#![no_main]

use libfuzzer_sys::fuzz_target;
use rfa1_radio::ReceivedFrame;

fuzz_target!(|data: &[u8]| {
    // First byte is the PHY length, the rest a receive buffer image
    if let Some((&length, buffer)) = data.split_first() {
        let _ = ReceivedFrame::from_buffer(length, buffer);
    }
});
