//! Frame tracing through the `log` facade.
//!
//! Both helpers log at debug level under the `rfa1_radio::frame` target and
//! return early when that level is filtered out, so the hex rendering is
//! only paid for when someone is watching.
//!
//! ```rust
//! use rfa1_radio::util::logging::{log_frame_hex, log_frame_structured};
//!
//! let psdu = [0x61, 0x88, 0x2A, 0xCD, 0xAB];
//! log_frame_hex("RX frame", &psdu);
//! log_frame_structured("coordinator", &psdu, Some("data"), Some(0x0002));
//! ```

use crate::util::hex::format_hex_compact;

const TARGET: &str = "rfa1_radio::frame";

/// Longest PSDU prefix rendered in a log line
const SHOWN_OCTETS: usize = 48;

fn render(psdu: &[u8]) -> String {
    let shown = &psdu[..psdu.len().min(SHOWN_OCTETS)];
    if psdu.len() > shown.len() {
        format!("{} +{}", format_hex_compact(shown), psdu.len() - shown.len())
    } else {
        format_hex_compact(shown)
    }
}

/// Dump a PSDU as hex, truncated after the first 48 octets.
pub fn log_frame_hex(label: &str, psdu: &[u8]) {
    if log::log_enabled!(target: TARGET, log::Level::Debug) {
        log::debug!(target: TARGET, "{label} [{}]: {}", psdu.len(), render(psdu));
    }
}

/// One line summary of a frame that just left a transmitter.
pub fn log_frame_structured(
    node: &str,
    psdu: &[u8],
    frame_type: Option<&str>,
    source: Option<u16>,
) {
    if !log::log_enabled!(target: TARGET, log::Level::Debug) {
        return;
    }
    let source = source.map_or_else(|| "-".to_string(), |addr| format!("0x{addr:04X}"));
    log::debug!(
        target: TARGET,
        "{node} sent {} octets type={} src={source}: {}",
        psdu.len(),
        frame_type.unwrap_or("?"),
        render(psdu)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_truncates_long_frames() {
        let psdu: Vec<u8> = (0..50).collect();
        let line = render(&psdu);
        assert!(line.starts_with("00 01 02"));
        assert!(line.ends_with("2f +2"));
        assert_eq!(render(&[0x02, 0x00, 0x2A]), "02 00 2a");
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_helpers_run_with_logging_enabled() {
        let _ = env_logger::builder().is_test(true).try_init();
        log_frame_hex("empty", &[]);
        log_frame_structured("ack", &[0x02, 0x00, 0x2A], Some("ack"), None);
        log_frame_structured("data", &[0x41, 0x88, 0x01], None, Some(0x0001));
    }
}
